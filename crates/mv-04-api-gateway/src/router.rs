//! Route table and middleware assembly.

use crate::domain::config::GatewayConfig;
use crate::handlers::{callbacks, checks, coverage, ops};
use crate::middleware::{
    create_cors_layer, BasicAuthLayer, ClientIpLayer, TimeoutLayer, TracingLayer,
    TrustedProxyConfig,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use mv_02_callback_verification::CallbackVerificationApi;
use mv_03_check_lifecycle::{CheckLifecycleApi, CoverageApi};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

/// Paths the provider posts signed callbacks to
pub const CALLBACK_PATHS: [&str; 2] = ["/callback", "/phone-check/callback"];

/// Application state shared across handlers.
///
/// Each handle is owned here and nowhere else; nothing is process-global.
#[derive(Clone)]
pub struct AppState {
    pub checks: Arc<dyn CheckLifecycleApi>,
    pub coverage: Arc<dyn CoverageApi>,
    pub callbacks: Arc<dyn CallbackVerificationApi>,
}

impl AppState {
    pub fn new(
        checks: Arc<dyn CheckLifecycleApi>,
        coverage: Arc<dyn CoverageApi>,
        callbacks: Arc<dyn CallbackVerificationApi>,
    ) -> Self {
        Self {
            checks,
            coverage,
            callbacks,
        }
    }
}

/// Build the full router with its middleware stack.
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let mut exempt: Vec<&str> = CALLBACK_PATHS.to_vec();
    exempt.push("/health");

    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new())
        .layer(ClientIpLayer::new(TrustedProxyConfig::from(&config.security)))
        .layer(TimeoutLayer::new(config.timeouts.request))
        .layer(BasicAuthLayer::new(&config.basic_auth, &exempt));

    let router = Router::new()
        // PhoneCheck
        .route("/check", post(checks::create_phone_check))
        .route(
            "/phone-check",
            post(checks::create_phone_check).get(checks::phone_check_status),
        )
        .route("/check_status", get(checks::phone_check_status))
        .route(CALLBACK_PATHS[0], post(callbacks::check_callback))
        .route(CALLBACK_PATHS[1], post(callbacks::check_callback))
        // SubscriberCheck
        .route("/subscriber-check", post(checks::create_subscriber_check))
        .route(
            "/subscriber-check/:check_id",
            get(checks::subscriber_check_status),
        )
        // SimCheck
        .route("/sim-check", post(checks::create_sim_check))
        // Coverage
        .route("/country", get(coverage::country_coverage))
        .route("/device", get(coverage::device_coverage))
        .route("/my-ip", get(coverage::my_ip))
        // Operations
        .route("/traces", post(ops::traces))
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics));

    let router = if config.static_files.enabled {
        router.fallback_service(ServeDir::new(&config.static_files.dir))
    } else {
        router
    };

    router
        .layer(DefaultBodyLimit::max(config.limits.max_request_size))
        .layer(middleware)
        .with_state(state)
}
