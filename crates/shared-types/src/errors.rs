//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors raised while validating client-supplied input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required parameter was absent or blank.
    #[error("{field} parameter is required")]
    MissingField { field: &'static str },
}

impl ValidationError {
    /// Name of the offending parameter.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
        }
    }
}
