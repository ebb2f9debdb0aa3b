//! # Callback Errors
//!
//! Reasons a callback was rejected. None of these reach the caller.

use mv_01_key_resolver::KeyResolutionError;
use thiserror::Error;

/// Errors that can occur during callback verification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallbackError {
    /// Signature header absent, unparsable, or naming headers the request lacks
    #[error("Malformed signature: {0}")]
    MalformedSignature(String),

    /// Key id could not be resolved
    #[error(transparent)]
    KeyResolution(#[from] KeyResolutionError),

    /// Declared algorithm is not one we verify
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Algorithm and key family do not go together
    #[error("Algorithm {algorithm} cannot be used with {key_type} key")]
    AlgorithmMismatch {
        algorithm: String,
        key_type: String,
    },

    /// Body present but not covered by a signed digest
    #[error("Body is not covered by a signed digest")]
    MissingDigest,

    /// Signed digest does not match the received body
    #[error("Digest mismatch")]
    DigestMismatch,

    /// Date, created or expires outside the allowed window
    #[error("Request outside freshness window ({skew_secs}s)")]
    StaleRequest { skew_secs: i64 },

    /// Cryptographic check failed
    #[error("Signature mismatch")]
    SignatureMismatch,
}

impl CallbackError {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            CallbackError::MalformedSignature(_) => "malformed_signature",
            CallbackError::KeyResolution(e) => e.reason(),
            CallbackError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            CallbackError::AlgorithmMismatch { .. } => "algorithm_mismatch",
            CallbackError::MissingDigest => "missing_digest",
            CallbackError::DigestMismatch => "digest_mismatch",
            CallbackError::StaleRequest { .. } => "stale_request",
            CallbackError::SignatureMismatch => "signature_mismatch",
        }
    }
}
