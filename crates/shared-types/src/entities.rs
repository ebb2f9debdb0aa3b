//! # Core Entities
//!
//! Identifiers and lifecycle states for verification checks.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject of a check, as supplied by the client (usually E.164).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Wire name of the parameter, used in validation messages.
    pub const FIELD: &'static str = "phone_number";

    /// Accepts any non-blank value. Format checks are left to the provider.
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        non_blank(raw, Self::FIELD).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Provider-assigned check identifier.
///
/// Never treated as proof of authenticity; it only keys read-only lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckId(String);

impl CheckId {
    pub const FIELD: &'static str = "check_id";

    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        non_blank(raw, Self::FIELD).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn non_blank(raw: Option<&str>, field: &'static str) -> Result<String, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ValidationError::MissingField { field }),
    }
}

/// The three kinds of verification the provider offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    /// Ownership of the number, proven over the mobile data session.
    PhoneOwnership,
    /// Ownership plus SIM-change information.
    SubscriberIdentity,
    /// Synchronous SIM-swap lookup; not pollable.
    SimSwap,
}

impl CheckKind {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckKind::PhoneOwnership => "phone_check",
            CheckKind::SubscriberIdentity => "subscriber_check",
            CheckKind::SimSwap => "sim_check",
        }
    }

    pub fn is_pollable(&self) -> bool {
        !matches!(self, CheckKind::SimSwap)
    }
}

/// Observed lifecycle of a check: `Created -> Pending -> {Matched | NotMatched | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Created,
    Pending,
    Matched,
    NotMatched,
    Failed,
}

impl CheckState {
    /// Map the provider's `status` string and `match` flag onto a state.
    ///
    /// Unknown statuses are reported as `Pending`; the provider may add
    /// intermediate states and the check is not finished until it says so.
    pub fn from_provider(status: &str, matched: bool) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "ACCEPTED" => CheckState::Created,
            "COMPLETED" if matched => CheckState::Matched,
            "COMPLETED" => CheckState::NotMatched,
            "EXPIRED" | "ERROR" => CheckState::Failed,
            _ => CheckState::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckState::Matched | CheckState::NotMatched | CheckState::Failed
        )
    }
}
