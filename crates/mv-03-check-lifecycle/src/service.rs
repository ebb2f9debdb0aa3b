//! # Check Lifecycle Service
//!
//! Implements `CheckLifecycleApi` and `CoverageApi` over a `ProviderClient`.

use crate::domain::errors::{CheckError, ProviderError};
use crate::domain::views::{
    CheckCreated, DeviceCoverage, PhoneCheckStatus, SimCheckResult, SubscriberCheckStatus,
};
use crate::ports::inbound::{CheckLifecycleApi, CoverageApi};
use crate::ports::outbound::ProviderClient;
use mv_telemetry::{CHECKS_CREATED, CHECK_STATUS_QUERIES, PROVIDER_ERRORS, PROVIDER_LATENCY};
use serde_json::Value;
use shared_types::{CheckId, CheckKind, PhoneNumber, ValidationError};
use std::future::Future;
use std::time::Instant;

/// Check Lifecycle Service.
pub struct CheckLifecycleService<P: ProviderClient> {
    provider: P,
}

impl<P: ProviderClient> CheckLifecycleService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Await a provider call, timing it and logging any failure with its
    /// structured payload.
    async fn call<T>(
        &self,
        operation: &'static str,
        request: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, CheckError> {
        let started = Instant::now();
        let result = request.await;
        PROVIDER_LATENCY
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());

        result.map_err(|e| {
            PROVIDER_ERRORS.with_label_values(&[operation]).inc();
            tracing::error!(
                operation,
                error = %e,
                payload = ?e.payload(),
                transient = e.is_transient(),
                "provider call failed"
            );
            CheckError::Provider(e)
        })
    }

    /// Map a projection failure the same way as a failed call.
    fn project<T>(
        operation: &'static str,
        result: Result<T, ProviderError>,
    ) -> Result<T, CheckError> {
        result.map_err(|e| {
            PROVIDER_ERRORS.with_label_values(&[operation]).inc();
            tracing::error!(operation, error = %e, "malformed provider response");
            CheckError::Provider(e)
        })
    }
}

#[async_trait::async_trait]
impl<P: ProviderClient> CheckLifecycleApi for CheckLifecycleService<P> {
    async fn create_phone_check(
        &self,
        phone_number: Option<&str>,
    ) -> Result<CheckCreated, CheckError> {
        let phone_number = PhoneNumber::parse(phone_number)?;
        let check = self
            .call(
                "create_phone_check",
                self.provider.create_phone_check(&phone_number),
            )
            .await?;
        let created = Self::project("create_phone_check", CheckCreated::from_provider(&check))?;

        CHECKS_CREATED
            .with_label_values(&[CheckKind::PhoneOwnership.as_str()])
            .inc();
        tracing::info!(check_id = %created.check_id, "phone check created");
        Ok(created)
    }

    async fn phone_check_status(
        &self,
        check_id: Option<&str>,
    ) -> Result<PhoneCheckStatus, CheckError> {
        let check_id = CheckId::parse(check_id)?;
        let check = self
            .call("get_phone_check", self.provider.get_phone_check(&check_id))
            .await?;
        let status = Self::project("get_phone_check", PhoneCheckStatus::from_provider(&check))?;

        CHECK_STATUS_QUERIES
            .with_label_values(&[CheckKind::PhoneOwnership.as_str()])
            .inc();
        tracing::debug!(check_id = %status.check_id, state = ?status.state, "phone check status");
        Ok(status)
    }

    async fn create_subscriber_check(
        &self,
        phone_number: Option<&str>,
    ) -> Result<CheckCreated, CheckError> {
        let phone_number = PhoneNumber::parse(phone_number)?;
        let check = self
            .call(
                "create_subscriber_check",
                self.provider.create_subscriber_check(&phone_number),
            )
            .await?;
        let created =
            Self::project("create_subscriber_check", CheckCreated::from_provider(&check))?;

        CHECKS_CREATED
            .with_label_values(&[CheckKind::SubscriberIdentity.as_str()])
            .inc();
        tracing::info!(check_id = %created.check_id, "subscriber check created");
        Ok(created)
    }

    async fn subscriber_check_status(
        &self,
        check_id: Option<&str>,
    ) -> Result<SubscriberCheckStatus, CheckError> {
        let check_id = CheckId::parse(check_id)?;
        let check = self
            .call(
                "get_subscriber_check",
                self.provider.get_subscriber_check(&check_id),
            )
            .await?;
        let status = Self::project(
            "get_subscriber_check",
            SubscriberCheckStatus::from_provider(&check),
        )?;

        CHECK_STATUS_QUERIES
            .with_label_values(&[CheckKind::SubscriberIdentity.as_str()])
            .inc();
        Ok(status)
    }

    async fn create_sim_check(
        &self,
        phone_number: Option<&str>,
    ) -> Result<SimCheckResult, CheckError> {
        let phone_number = PhoneNumber::parse(phone_number)?;
        let check = self
            .call("create_sim_check", self.provider.create_sim_check(&phone_number))
            .await?;

        CHECKS_CREATED
            .with_label_values(&[CheckKind::SimSwap.as_str()])
            .inc();
        tracing::info!(check_id = %check.check_id, "sim check completed");
        Ok(SimCheckResult::from_provider(&check))
    }
}

#[async_trait::async_trait]
impl<P: ProviderClient> CoverageApi for CheckLifecycleService<P> {
    async fn country_coverage(&self, country_code: Option<&str>) -> Result<Value, CheckError> {
        let country_code = match country_code.map(str::trim) {
            Some(code) if !code.is_empty() => code,
            _ => {
                return Err(ValidationError::MissingField {
                    field: "country_code",
                }
                .into())
            }
        };
        self.call(
            "get_country_coverage",
            self.provider.get_country_coverage(country_code),
        )
        .await
    }

    async fn device_coverage(&self, ip_address: &str) -> Result<DeviceCoverage, CheckError> {
        let body = self
            .call(
                "get_device_coverage",
                self.provider.get_device_coverage(ip_address),
            )
            .await?;
        Ok(DeviceCoverage::from_body(body))
    }
}
