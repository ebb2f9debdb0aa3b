//! PhoneCheck, SubscriberCheck and SimCheck routes.

use crate::domain::error::ApiError;
use crate::router::AppState;
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Path, Query, Request, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Form, Json,
};
use mv_03_check_lifecycle::{CheckCreated, PhoneCheckStatus, SimCheckResult, SubscriberCheckStatus};
use serde::Deserialize;

/// Body of the create routes, accepted as JSON or as a urlencoded form.
///
/// Unparseable bodies yield an empty request so the missing parameter is
/// reported the same way as an absent one.
#[derive(Debug, Default, Deserialize)]
pub struct CheckRequest {
    pub phone_number: Option<String>,
}

#[async_trait]
impl<S: Send + Sync> FromRequest<S> for CheckRequest {
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        if is_form {
            return Ok(Form::<CheckRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .unwrap_or_default());
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckStatusQuery {
    pub check_id: Option<String>,
}

/// `POST /check`, `POST /phone-check`
pub async fn create_phone_check(
    State(state): State<AppState>,
    body: CheckRequest,
) -> Result<Json<CheckCreated>, ApiError> {
    let created = state
        .checks
        .create_phone_check(body.phone_number.as_deref())
        .await?;
    Ok(Json(created))
}

/// `GET /check_status?check_id=`, `GET /phone-check?check_id=`
pub async fn phone_check_status(
    State(state): State<AppState>,
    Query(query): Query<CheckStatusQuery>,
) -> Result<Json<PhoneCheckStatus>, ApiError> {
    let status = state
        .checks
        .phone_check_status(query.check_id.as_deref())
        .await?;
    Ok(Json(status))
}

/// `POST /subscriber-check`
pub async fn create_subscriber_check(
    State(state): State<AppState>,
    body: CheckRequest,
) -> Result<Json<CheckCreated>, ApiError> {
    let created = state
        .checks
        .create_subscriber_check(body.phone_number.as_deref())
        .await?;
    Ok(Json(created))
}

/// `GET /subscriber-check/:check_id`
pub async fn subscriber_check_status(
    State(state): State<AppState>,
    Path(check_id): Path<String>,
) -> Result<Json<SubscriberCheckStatus>, ApiError> {
    let status = state
        .checks
        .subscriber_check_status(Some(&check_id))
        .await?;
    Ok(Json(status))
}

/// `POST /sim-check`: answered directly, nothing to poll.
pub async fn create_sim_check(
    State(state): State<AppState>,
    body: CheckRequest,
) -> Result<Json<SimCheckResult>, ApiError> {
    let result = state
        .checks
        .create_sim_check(body.phone_number.as_deref())
        .await?;
    Ok(Json(result))
}
