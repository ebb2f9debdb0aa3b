//! # Key Resolution Errors

use thiserror::Error;

/// Errors that can occur while resolving a signing key.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyResolutionError {
    /// The key set was fetched but does not list this key id
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// The key set could not be fetched or parsed
    #[error("Key set fetch failed: {0}")]
    KeyFetch(String),

    /// A JWK was present but could not be turned into usable key material
    #[error("Unsupported key {kid}: {reason}")]
    UnsupportedKey { kid: String, reason: String },
}

impl KeyResolutionError {
    /// Stable label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            KeyResolutionError::KeyNotFound(_) => "key_not_found",
            KeyResolutionError::KeyFetch(_) => "key_fetch",
            KeyResolutionError::UnsupportedKey { .. } => "unsupported_key",
        }
    }
}
