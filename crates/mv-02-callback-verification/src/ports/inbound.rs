//! # Inbound Ports (Driving Ports / API)

use crate::domain::envelope::CallbackEnvelope;

/// Result of verifying one callback.
///
/// `reason` is for logs and metrics only and must not be sent to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub accepted: bool,
    pub key_id: Option<String>,
    pub reason: Option<&'static str>,
}

impl VerificationOutcome {
    pub fn accepted(key_id: String) -> Self {
        Self {
            accepted: true,
            key_id: Some(key_id),
            reason: None,
        }
    }

    pub fn rejected(key_id: Option<String>, reason: &'static str) -> Self {
        Self {
            accepted: false,
            key_id,
            reason: Some(reason),
        }
    }
}

/// Callback authentication.
#[async_trait::async_trait]
pub trait CallbackVerificationApi: Send + Sync {
    /// Verify a callback. Never fails: every problem is a rejection.
    async fn verify(&self, envelope: &CallbackEnvelope) -> VerificationOutcome;
}
