//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::ProviderError;
use crate::domain::model::ProviderCheck;
use serde_json::Value;
use shared_types::{CheckId, PhoneNumber};

/// Authenticated access to the verification provider.
///
/// Every call must be bounded by a timeout; none are retried here.
#[async_trait::async_trait]
pub trait ProviderClient: Send + Sync {
    async fn create_phone_check(&self, phone_number: &PhoneNumber)
        -> Result<ProviderCheck, ProviderError>;

    async fn get_phone_check(&self, check_id: &CheckId) -> Result<ProviderCheck, ProviderError>;

    async fn create_subscriber_check(
        &self,
        phone_number: &PhoneNumber,
    ) -> Result<ProviderCheck, ProviderError>;

    async fn get_subscriber_check(&self, check_id: &CheckId)
        -> Result<ProviderCheck, ProviderError>;

    async fn create_sim_check(&self, phone_number: &PhoneNumber)
        -> Result<ProviderCheck, ProviderError>;

    async fn get_country_coverage(&self, country_code: &str) -> Result<Value, ProviderError>;

    /// A 4xx problem document is returned as `Ok`.
    async fn get_device_coverage(&self, ip_address: &str) -> Result<Value, ProviderError>;
}
