//! In-process stand-in for the verification provider.
//!
//! Serves the OAuth token endpoint, the check endpoints the lifecycle uses
//! and the JWKS document, on an ephemeral local port. Every endpoint counts
//! its hits so tests can assert what reached the provider.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mv_01_key_resolver::{Jwk, JwkSet};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Hit counters and the currently published keys.
#[derive(Default)]
pub struct ProviderState {
    pub tokens: AtomicUsize,
    pub checks_created: AtomicUsize,
    pub status_queries: AtomicUsize,
    pub jwks_fetches: AtomicUsize,
    pub keys: Mutex<Vec<Jwk>>,
}

impl ProviderState {
    pub fn publish(&self, keys: Vec<Jwk>) {
        *self.keys.lock().unwrap() = keys;
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// A running provider stand-in.
pub struct StubProvider {
    pub base_url: String,
    pub state: Arc<ProviderState>,
}

impl StubProvider {
    /// Bind 127.0.0.1:0 and serve in the background.
    pub async fn spawn(keys: Vec<Jwk>) -> Self {
        let state = Arc::new(ProviderState::default());
        state.publish(keys);

        let app = Router::new()
            .route("/oauth2/v1/token", post(token))
            .route("/phone_check/v0.2/checks", post(create_check))
            .route("/phone_check/v0.2/checks/:id", get(get_check))
            .route("/subscriber_check/v0.2/checks", post(create_check))
            .route("/subscriber_check/v0.2/checks/:id", get(get_subscriber_check))
            .route("/sim_check/v0.1/checks", post(create_sim_check))
            .route("/.well-known/jwks.json", get(jwks))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }
}

async fn token(State(state): State<Arc<ProviderState>>) -> Json<Value> {
    state.tokens.fetch_add(1, Ordering::SeqCst);
    Json(json!({"access_token": "stub-token", "token_type": "bearer", "expires_in": 3600}))
}

async fn create_check(State(state): State<Arc<ProviderState>>, Json(body): Json<Value>) -> Json<Value> {
    state.checks_created.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "check_id": "abc123",
        "status": "ACCEPTED",
        "phone_number": body["phone_number"],
        "_links": {"check_url": {"href": "https://provider.test/checks/abc123/redirect"}}
    }))
}

async fn get_check(
    State(state): State<Arc<ProviderState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    state.status_queries.fetch_add(1, Ordering::SeqCst);
    if id != "abc123" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"status": 404, "detail": "check not found"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({"check_id": id, "status": "COMPLETED", "match": true})),
    )
}

async fn get_subscriber_check(
    State(state): State<Arc<ProviderState>>,
    Path(id): Path<String>,
) -> Json<Value> {
    state.status_queries.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "check_id": id,
        "status": "COMPLETED",
        "match": true,
        "no_sim_change": false,
        "last_sim_change_at": "2024-05-01T10:00:00Z"
    }))
}

async fn create_sim_check(State(state): State<Arc<ProviderState>>) -> Json<Value> {
    state.checks_created.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "check_id": "sim-1",
        "status": "COMPLETED",
        "no_sim_change": true,
        "last_sim_change_at": null
    }))
}

async fn jwks(State(state): State<Arc<ProviderState>>) -> Json<JwkSet> {
    state.jwks_fetches.fetch_add(1, Ordering::SeqCst);
    let keys = state.keys.lock().unwrap().clone();
    Json(JwkSet { keys })
}
