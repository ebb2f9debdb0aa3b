//! # Inbound Ports (Driving Ports / API)
//!
//! Inputs arrive raw (`Option<&str>`) so validation happens here, before any
//! provider call, regardless of which boundary drives the API.

use crate::domain::errors::CheckError;
use crate::domain::views::{
    CheckCreated, DeviceCoverage, PhoneCheckStatus, SimCheckResult, SubscriberCheckStatus,
};
use serde_json::Value;

/// Check creation and polling, one pair per check kind.
#[async_trait::async_trait]
pub trait CheckLifecycleApi: Send + Sync {
    /// # Errors
    /// * `CheckError::Validation` - `phone_number` absent or blank
    /// * `CheckError::Provider` - provider call failed
    async fn create_phone_check(&self, phone_number: Option<&str>)
        -> Result<CheckCreated, CheckError>;

    /// # Errors
    /// * `CheckError::Validation` - `check_id` absent or blank
    /// * `CheckError::Provider` - provider call failed
    async fn phone_check_status(&self, check_id: Option<&str>)
        -> Result<PhoneCheckStatus, CheckError>;

    async fn create_subscriber_check(
        &self,
        phone_number: Option<&str>,
    ) -> Result<CheckCreated, CheckError>;

    async fn subscriber_check_status(
        &self,
        check_id: Option<&str>,
    ) -> Result<SubscriberCheckStatus, CheckError>;

    /// Single-call SIM-swap lookup; there is nothing to poll afterwards.
    async fn create_sim_check(&self, phone_number: Option<&str>)
        -> Result<SimCheckResult, CheckError>;
}

/// Coverage lookups, passed through from the provider.
#[async_trait::async_trait]
pub trait CoverageApi: Send + Sync {
    /// # Errors
    /// * `CheckError::Validation` - `country_code` absent or blank
    async fn country_coverage(&self, country_code: Option<&str>) -> Result<Value, CheckError>;

    /// Coverage for a device IP. A provider problem document is returned
    /// as-is together with its status.
    async fn device_coverage(&self, ip_address: &str) -> Result<DeviceCoverage, CheckError>;
}
