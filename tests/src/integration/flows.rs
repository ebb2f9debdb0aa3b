//! # Integration Test Flows
//!
//! The server's own wiring (`server_runtime::build_state`) pointed at the
//! in-process provider, driven through the full gateway router.
//!
//! ## Flows Tested
//!
//! 1. **Check lifecycle**: create → poll for PhoneCheck and SubscriberCheck,
//!    single-call SimCheck, validation before any provider traffic
//! 2. **Callbacks**: signed callbacks accepted, tampered ones rejected, key
//!    cache unaffected by bad requests, one key-set fetch for a burst

use super::provider::{ProviderState, StubProvider};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use mv_02_callback_verification::test_utils::{corrupt_signature, TestSigner};
use mv_02_callback_verification::CallbackEnvelope;
use mv_04_api_gateway::{build_router, GatewayConfig};
use serde_json::{json, Value};
use server_runtime::build_state;
use tower::ServiceExt;

// =============================================================================
// TEST FIXTURES
// =============================================================================

const CALLBACK_BODY: &[u8] =
    br#"{"check_id":"abc123","status":"COMPLETED","match":true,"event_type":"phone_check.completed"}"#;

struct World {
    provider: StubProvider,
    router: Router,
}

impl World {
    async fn start(signers: &[&TestSigner]) -> Self {
        let provider = StubProvider::spawn(signers.iter().map(|s| s.jwk()).collect()).await;

        let mut config = GatewayConfig::default();
        config.provider.base_url = provider.base_url.clone();
        config.provider.client_id = "client".to_string();
        config.provider.client_secret = "secret".to_string();
        config.static_files.enabled = false;
        config.validate().unwrap();

        let state = build_state(&config).unwrap();
        Self {
            router: build_router(state, &config),
            provider,
        }
    }

    fn provider(&self) -> &ProviderState {
        &self.provider.state
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Turn a signed envelope back into the HTTP request the provider would send.
fn callback_request(envelope: &CallbackEnvelope) -> Request<Body> {
    let mut builder = Request::builder()
        .method(envelope.method.as_str())
        .uri(envelope.path_and_query.as_str());
    for (name, value) in &envelope.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.body(Body::from(envelope.body.clone())).unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// CHECK LIFECYCLE
// =============================================================================

#[tokio::test]
async fn test_phone_check_create_then_poll() {
    let world = World::start(&[]).await;

    let response = world
        .send(post_json("/check", json!({"phone_number": "+447000000000"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "check_id": "abc123",
            "check_url": "https://provider.test/checks/abc123/redirect"
        })
    );

    let response = world.send(get("/check_status?check_id=abc123")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"check_id": "abc123", "match": true})
    );

    // One token serves both calls
    assert_eq!(ProviderState::count(&world.provider().tokens), 1);
    assert_eq!(ProviderState::count(&world.provider().checks_created), 1);
}

#[tokio::test]
async fn test_status_polling_is_idempotent() {
    let world = World::start(&[]).await;

    let first = body_json(world.send(get("/phone-check?check_id=abc123")).await).await;
    let second = body_json(world.send(get("/phone-check?check_id=abc123")).await).await;
    assert_eq!(first, second);
    assert_eq!(ProviderState::count(&world.provider().status_queries), 2);
}

#[tokio::test]
async fn test_unknown_check_is_generic_500() {
    let world = World::start(&[]).await;

    let response = world.send(get("/check_status?check_id=nope")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    // Provider detail stays in the logs
    assert_eq!(
        body_json(response).await,
        json!({"error_message": "internal server error"})
    );
}

#[tokio::test]
async fn test_subscriber_check_create_then_poll() {
    let world = World::start(&[]).await;

    let response = world
        .send(post_json("/subscriber-check", json!({"phone_number": "+447000000000"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["check_id"], "abc123");

    let response = world.send(get("/subscriber-check/abc123")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "check_id": "abc123",
            "match": true,
            "no_sim_change": false,
            "last_sim_change_at": "2024-05-01T10:00:00Z"
        })
    );
}

#[tokio::test]
async fn test_sim_check_answers_without_polling() {
    let world = World::start(&[]).await;

    let response = world
        .send(post_json("/sim-check", json!({"phone_number": "+447000000000"})))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"no_sim_change": true, "last_sim_change_at": null})
    );
    assert_eq!(ProviderState::count(&world.provider().status_queries), 0);
}

#[tokio::test]
async fn test_missing_phone_number_never_reaches_provider() {
    let world = World::start(&[]).await;

    for uri in ["/check", "/phone-check", "/subscriber-check", "/sim-check"] {
        let response = world.send(post_json(uri, json!({"phone_number": "  "}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body_json(response).await,
            json!({"error_message": "phone_number parameter is required"})
        );
    }

    assert_eq!(ProviderState::count(&world.provider().tokens), 0);
    assert_eq!(ProviderState::count(&world.provider().checks_created), 0);
}

// =============================================================================
// CALLBACKS
// =============================================================================

#[tokio::test]
async fn test_signed_callbacks_accepted() {
    let ed = TestSigner::ed25519("ed-key", 11);
    let rsa = TestSigner::rsa("rsa-key");
    let world = World::start(&[&ed, &rsa]).await;

    for (signer, path) in [(&ed, "/callback"), (&rsa, "/phone-check/callback")] {
        let envelope = signer.signed_callback(path, CALLBACK_BODY, now());
        let response = world.send(callback_request(&envelope)).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", signer.key_id());
    }

    // Both keys arrived with the first fetch
    assert_eq!(ProviderState::count(&world.provider().jwks_fetches), 1);
}

#[tokio::test]
async fn test_unknown_key_rejected_after_fresh_fetch() {
    let published = TestSigner::ed25519("published", 1);
    let stranger = TestSigner::ed25519("stranger", 2);
    let world = World::start(&[&published]).await;

    for attempt in 1..=2 {
        let envelope = stranger.signed_callback("/callback", CALLBACK_BODY, now());
        let response = world.send(callback_request(&envelope)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        // No negative caching: every miss asks the provider again
        assert_eq!(
            ProviderState::count(&world.provider().jwks_fetches),
            attempt
        );
    }
}

#[tokio::test]
async fn test_rotated_key_picked_up_on_miss() {
    let old = TestSigner::ed25519("2024-01", 3);
    let new = TestSigner::ed25519("2024-02", 4);
    let world = World::start(&[&old]).await;

    let envelope = old.signed_callback("/callback", CALLBACK_BODY, now());
    assert_eq!(world.send(callback_request(&envelope)).await.status(), StatusCode::OK);

    world.provider().publish(vec![new.jwk()]);

    let envelope = new.signed_callback("/callback", CALLBACK_BODY, now());
    assert_eq!(world.send(callback_request(&envelope)).await.status(), StatusCode::OK);
    assert_eq!(ProviderState::count(&world.provider().jwks_fetches), 2);
}

#[tokio::test]
async fn test_tampered_callbacks_rejected() {
    let signer = TestSigner::ed25519("ed-key", 5);
    let world = World::start(&[&signer]).await;

    // Altered body
    let mut envelope = signer.signed_callback("/callback", CALLBACK_BODY, now());
    envelope.body = br#"{"check_id":"abc123","status":"COMPLETED","match":false}"#.to_vec();
    assert_eq!(
        world.send(callback_request(&envelope)).await.status(),
        StatusCode::BAD_REQUEST
    );

    // Posted to a different path than the one signed
    let envelope = signer.signed_callback("/phone-check/callback", CALLBACK_BODY, now());
    let mut request = callback_request(&envelope);
    *request.uri_mut() = "/callback".parse().unwrap();
    assert_eq!(world.send(request).await.status(), StatusCode::BAD_REQUEST);

    // Replayed well outside the clock-skew window
    let envelope = signer.signed_callback("/callback", CALLBACK_BODY, now() - 3600);
    assert_eq!(
        world.send(callback_request(&envelope)).await.status(),
        StatusCode::BAD_REQUEST
    );

    // No signature at all
    let request = Request::builder()
        .method("POST")
        .uri("/callback")
        .body(Body::from(CALLBACK_BODY))
        .unwrap();
    let response = world.send(request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty(), "rejections carry no reason");
}

#[tokio::test]
async fn test_corrupted_signature_does_not_poison_cache() {
    let signer = TestSigner::rsa("rsa-key");
    let world = World::start(&[&signer]).await;

    let mut forged = signer.signed_callback("/callback", CALLBACK_BODY, now());
    corrupt_signature(&mut forged);
    assert_eq!(
        world.send(callback_request(&forged)).await.status(),
        StatusCode::BAD_REQUEST
    );

    let genuine = signer.signed_callback("/callback", CALLBACK_BODY, now());
    assert_eq!(
        world.send(callback_request(&genuine)).await.status(),
        StatusCode::OK
    );

    // The forged request may trigger at most one refresh, never a flood
    assert!(ProviderState::count(&world.provider().jwks_fetches) <= 2);
}

#[tokio::test]
async fn test_callback_burst_shares_one_key_fetch() {
    let signer = TestSigner::ed25519("ed-key", 9);
    let world = World::start(&[&signer]).await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let router = world.router.clone();
        let envelope = signer.signed_callback("/callback", CALLBACK_BODY, now());
        tasks.push(tokio::spawn(async move {
            router.oneshot(callback_request(&envelope)).await.unwrap().status()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::OK);
    }

    assert_eq!(ProviderState::count(&world.provider().jwks_fetches), 1);
}
