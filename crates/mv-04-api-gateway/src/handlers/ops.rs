//! Health, metrics and the client trace sink.

use crate::domain::error::ApiError;
use axum::{
    body::Bytes,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};
use tracing::{error, info};

/// `GET /health`
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /metrics` in Prometheus text format
pub async fn metrics() -> Result<impl IntoResponse, ApiError> {
    let body = mv_telemetry::encode_metrics().map_err(|e| {
        error!(error = %e, "failed to encode metrics");
        ApiError::internal()
    })?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}

/// `POST /traces`: logs whatever the client sends and acknowledges it.
pub async fn traces(body: Bytes) -> StatusCode {
    match serde_json::from_slice::<Value>(&body) {
        Ok(value) => {
            let pretty = serde_json::to_string_pretty(&value).unwrap_or_default();
            info!(target: "client_traces", "{pretty}");
        }
        Err(_) => {
            info!(target: "client_traces", raw = %String::from_utf8_lossy(&body), "non-JSON trace body");
        }
    }
    StatusCode::OK
}
