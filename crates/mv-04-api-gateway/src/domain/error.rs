//! Gateway error types.
//!
//! `ApiError` is what a handler returns; it renders as
//! `{"error_message": ...}`. Only client errors carry their own message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mv_03_check_lifecycle::CheckError;
use serde_json::json;

/// Message sent for every server-side failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Handler error with a client-safe message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 with the given message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 500 with the generic message
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "authentication required")
    }

    pub fn timeout() -> Self {
        Self::new(StatusCode::GATEWAY_TIMEOUT, "request timed out")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error_message": self.message }))).into_response()
    }
}

impl From<CheckError> for ApiError {
    fn from(error: CheckError) -> Self {
        match error {
            CheckError::Validation(e) => ApiError::bad_request(e.to_string()),
            // Already logged with its payload by the lifecycle service
            CheckError::Provider(_) => ApiError::internal(),
        }
    }
}

/// Gateway startup and serving errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server loop terminated with an error
    #[error("server error: {0}")]
    Serve(String),
}
