//! Prometheus metrics for Mobile-Verify.
//!
//! All metrics follow the naming convention: `mv_<area>_<metric>_<unit>`
//!
//! Metrics live in a crate-local [`REGISTRY`] so embedding processes do not
//! collide with the default Prometheus registry.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry,
    TextEncoder,
};
use std::sync::Once;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // CHECK LIFECYCLE
    // =========================================================================

    /// Checks created, by kind
    pub static ref CHECKS_CREATED: CounterVec = CounterVec::new(
        Opts::new("mv_checks_created_total", "Checks created with the provider"),
        &["kind"]  // kind: phone_check/subscriber_check/sim_check
    ).expect("metric creation failed");

    /// Status polls, by kind
    pub static ref CHECK_STATUS_QUERIES: CounterVec = CounterVec::new(
        Opts::new("mv_check_status_queries_total", "Check status lookups"),
        &["kind"]
    ).expect("metric creation failed");

    /// Provider failures, by operation
    pub static ref PROVIDER_ERRORS: CounterVec = CounterVec::new(
        Opts::new("mv_provider_errors_total", "Failed calls to the verification provider"),
        &["operation"]
    ).expect("metric creation failed");

    /// Provider call latency
    pub static ref PROVIDER_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "mv_provider_request_duration_seconds",
            "Time spent waiting on the verification provider"
        ).buckets(exponential_buckets(0.005, 2.0, 12).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");

    // =========================================================================
    // CALLBACKS
    // =========================================================================

    /// Callbacks received, by outcome
    pub static ref CALLBACKS_RECEIVED: CounterVec = CounterVec::new(
        Opts::new("mv_callbacks_total", "Signed callbacks received"),
        &["outcome"]  // outcome: accepted/rejected
    ).expect("metric creation failed");

    /// Callback rejections, by reason
    pub static ref CALLBACK_REJECTIONS: CounterVec = CounterVec::new(
        Opts::new("mv_callback_rejections_total", "Callback rejections by reason"),
        &["reason"]
    ).expect("metric creation failed");

    /// Key-set fetches, by outcome
    pub static ref KEY_SET_FETCHES: CounterVec = CounterVec::new(
        Opts::new("mv_key_set_fetches_total", "Fetches of the JWKS document"),
        &["outcome"]  // outcome: success/failure
    ).expect("metric creation failed");

    // =========================================================================
    // HTTP
    // =========================================================================

    /// Requests served, by method and status
    pub static ref HTTP_REQUESTS: CounterVec = CounterVec::new(
        Opts::new("mv_http_requests_total", "HTTP requests served"),
        &["method", "status"]
    ).expect("metric creation failed");
}

/// Handle returned once metrics are registered.
pub struct MetricsHandle {
    _private: (),
}

static REGISTER: Once = Once::new();

/// Register all metrics with the crate registry.
///
/// Safe to call more than once; later calls are no-ops.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let mut result = Ok(());
    REGISTER.call_once(|| {
        let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(CHECKS_CREATED.clone()),
            Box::new(CHECK_STATUS_QUERIES.clone()),
            Box::new(PROVIDER_ERRORS.clone()),
            Box::new(PROVIDER_LATENCY.clone()),
            Box::new(CALLBACKS_RECEIVED.clone()),
            Box::new(CALLBACK_REJECTIONS.clone()),
            Box::new(KEY_SET_FETCHES.clone()),
            Box::new(HTTP_REQUESTS.clone()),
        ];

        for metric in metrics {
            if let Err(e) = REGISTRY.register(metric) {
                result = Err(TelemetryError::MetricsInit(e.to_string()));
                return;
            }
        }
    });
    result?;

    Ok(MetricsHandle { _private: () })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
