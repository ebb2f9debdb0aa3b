//! Middleware stack for the gateway.
//!
//! Layer order: Request → CORS → Tracing → ClientIp → Timeout → BasicAuth → Handler

pub mod basic_auth;
pub mod client_ip;
pub mod cors;
pub mod timeout;
pub mod tracing;

pub use basic_auth::{constant_time_compare, BasicAuthLayer};
pub use client_ip::{ClientIp, ClientIpLayer, TrustedProxyConfig};
pub use cors::create_cors_layer;
pub use timeout::TimeoutLayer;
pub use tracing::TracingLayer;
