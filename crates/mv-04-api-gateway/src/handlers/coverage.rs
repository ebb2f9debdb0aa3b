//! Coverage and caller-address routes.

use crate::domain::error::ApiError;
use crate::middleware::ClientIp;
use crate::router::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    pub country_code: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeviceQuery {
    /// Parameter name kept as published to existing clients
    pub id_address: Option<String>,
}

/// `GET /country?country_code=`
pub async fn country_coverage(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> Result<Json<Value>, ApiError> {
    let coverage = state
        .coverage
        .country_coverage(query.country_code.as_deref())
        .await?;
    Ok(Json(coverage))
}

/// `GET /device?id_address=`, defaulting to the caller's address.
///
/// Answers with the status carried in the provider payload.
pub async fn device_coverage(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    Query(query): Query<DeviceQuery>,
) -> Result<Response, ApiError> {
    let ip_address = query
        .id_address
        .filter(|ip| !ip.trim().is_empty())
        .unwrap_or_else(|| client_ip.to_string());

    let coverage = state.coverage.device_coverage(&ip_address).await?;
    let status = StatusCode::from_u16(coverage.status).unwrap_or(StatusCode::OK);
    Ok((status, Json(coverage.body)).into_response())
}

/// `GET /my-ip`
pub async fn my_ip(ClientIp(client_ip): ClientIp) -> Json<Value> {
    let response = json!({ "ip_address": client_ip.to_string() });
    debug!(ip_address = %client_ip, "my-ip");
    Json(response)
}
