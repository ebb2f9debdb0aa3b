//! # Check Errors

use serde_json::Value;
use shared_types::ValidationError;
use thiserror::Error;

/// Failures talking to the verification provider.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProviderError {
    /// No response within the configured timeout
    #[error("Provider request timed out: {0}")]
    Timeout(String),

    /// Connection or protocol failure
    #[error("Provider transport error: {0}")]
    Transport(String),

    /// Token endpoint refused the client credentials
    #[error("Provider authentication failed: {0}")]
    Auth(String),

    /// Non-2xx response; `payload` is the problem document if it was JSON
    #[error("Provider returned HTTP {status}")]
    Http { status: u16, payload: Option<Value> },

    /// 2xx response that did not have the expected shape
    #[error("Unexpected provider response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Structured error body, for logging.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ProviderError::Http { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Timeout(_) | ProviderError::Transport(_) => true,
            ProviderError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Errors surfaced by the check lifecycle.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckError {
    /// Required input missing; safe to show the caller
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Anything that went wrong with the provider; detail is for logs only
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}
