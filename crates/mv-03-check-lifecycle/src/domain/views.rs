//! Client-facing projections of provider checks.
//!
//! Each view lists exactly the fields the HTTP API returns for its kind.

use crate::domain::errors::ProviderError;
use crate::domain::model::ProviderCheck;
use serde::Serialize;
use serde_json::Value;
use shared_types::{CheckId, CheckState};

/// Returned when a pollable check is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckCreated {
    pub check_id: CheckId,
    pub check_url: String,
}

impl CheckCreated {
    /// # Errors
    /// * `ProviderError::Decode` - missing id or `_links.check_url`
    pub fn from_provider(check: &ProviderCheck) -> Result<Self, ProviderError> {
        let check_id = provider_check_id(check)?;
        let check_url = check
            .check_url()
            .ok_or_else(|| ProviderError::Decode("missing _links.check_url".to_string()))?
            .to_string();
        Ok(Self {
            check_id,
            check_url,
        })
    }
}

/// PhoneCheck status: `{check_id, match}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhoneCheckStatus {
    pub check_id: CheckId,
    #[serde(rename = "match")]
    pub matched: bool,
    #[serde(skip)]
    pub state: CheckState,
}

impl PhoneCheckStatus {
    pub fn from_provider(check: &ProviderCheck) -> Result<Self, ProviderError> {
        let matched = check.matched.unwrap_or(false);
        Ok(Self {
            check_id: provider_check_id(check)?,
            matched,
            state: state_of(check, matched),
        })
    }
}

/// SubscriberCheck status: PhoneCheck fields plus SIM-change data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriberCheckStatus {
    pub check_id: CheckId,
    #[serde(rename = "match")]
    pub matched: bool,
    pub no_sim_change: bool,
    pub last_sim_change_at: Option<String>,
    #[serde(skip)]
    pub state: CheckState,
}

impl SubscriberCheckStatus {
    pub fn from_provider(check: &ProviderCheck) -> Result<Self, ProviderError> {
        let matched = check.matched.unwrap_or(false);
        Ok(Self {
            check_id: provider_check_id(check)?,
            matched,
            no_sim_change: check.no_sim_change.unwrap_or(false),
            last_sim_change_at: check.last_sim_change_at.clone(),
            state: state_of(check, matched),
        })
    }
}

/// SimCheck result, returned directly at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimCheckResult {
    pub no_sim_change: bool,
    pub last_sim_change_at: Option<String>,
}

impl SimCheckResult {
    pub fn from_provider(check: &ProviderCheck) -> Self {
        Self {
            no_sim_change: check.no_sim_change.unwrap_or(false),
            last_sim_change_at: check.last_sim_change_at.clone(),
        }
    }
}

/// Device coverage payload and the HTTP status to answer with.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCoverage {
    pub status: u16,
    pub body: Value,
}

impl DeviceCoverage {
    /// Problem documents carry their own `status`; anything else is a 200.
    pub fn from_body(body: Value) -> Self {
        let status = body
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .filter(|s| (100..=599).contains(s))
            .unwrap_or(200);
        Self { status, body }
    }
}

fn provider_check_id(check: &ProviderCheck) -> Result<CheckId, ProviderError> {
    CheckId::parse(Some(&check.check_id))
        .map_err(|_| ProviderError::Decode("missing check_id".to_string()))
}

fn state_of(check: &ProviderCheck, matched: bool) -> CheckState {
    CheckState::from_provider(check.status.as_deref().unwrap_or(""), matched)
}
