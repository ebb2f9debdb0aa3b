//! Signed provider callbacks.

use crate::router::AppState;
use axum::{
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, Method, StatusCode},
};
use mv_02_callback_verification::CallbackEnvelope;
use tracing::{debug, info};

/// `POST /callback`, `POST /phone-check/callback`
///
/// 200 when the signature verifies, 400 otherwise. The caller never learns
/// why a callback was rejected.
pub async fn check_callback(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let envelope = to_envelope(&method, &uri, &headers, &body);
    debug!(
        headers = ?envelope.headers,
        body = %String::from_utf8_lossy(&envelope.body),
        "received callback"
    );

    let outcome = state.callbacks.verify(&envelope).await;
    if outcome.accepted {
        info!(key_id = ?outcome.key_id, "callback accepted");
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    }
}

/// Header values that are not visible ASCII are dropped.
pub fn to_envelope(
    method: &Method,
    uri: &axum::http::Uri,
    headers: &HeaderMap,
    body: &Bytes,
) -> CallbackEnvelope {
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());

    let mut envelope = CallbackEnvelope::new(method.as_str(), path_and_query).with_body(body.to_vec());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            envelope = envelope.with_header(name.as_str(), value);
        }
    }
    envelope
}
