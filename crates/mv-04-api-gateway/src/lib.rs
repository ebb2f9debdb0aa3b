//! # API Gateway (MV-04)
//!
//! The HTTP boundary. Validates nothing itself: raw inputs are handed to the
//! check lifecycle, which rejects missing parameters before any provider
//! call, and callbacks are handed to the verifier as framework-free envelopes.
//!
//! ## Routes
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | POST | `/check`, `/phone-check` | create PhoneCheck |
//! | GET | `/check_status`, `/phone-check` | PhoneCheck status |
//! | POST | `/callback`, `/phone-check/callback` | signed callback |
//! | POST | `/subscriber-check` | create SubscriberCheck |
//! | GET | `/subscriber-check/:check_id` | SubscriberCheck status |
//! | POST | `/sim-check` | SimCheck |
//! | GET | `/country`, `/device` | coverage |
//! | GET | `/my-ip` | caller address |
//! | POST | `/traces` | client trace sink |
//! | GET | `/health`, `/metrics` | operations |
//!
//! Anything else falls through to the static file directory.
//!
//! ## Middleware
//!
//! ```text
//! Request → CORS → Tracing → ClientIp → Timeout → BasicAuth → Handler
//! ```
//!
//! ## Error Responses
//!
//! Client errors are `400 {"error_message": "..."}`. Everything else is a
//! generic 500; detail only reaches the logs.

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::config::{
    BasicAuthConfig, CallbackConfig, ConfigError, CorsConfig, GatewayConfig, HttpConfig,
    LimitsConfig, ProviderConfig, SecurityConfig, StaticFilesConfig, TimeoutConfig,
};
pub use domain::error::{ApiError, GatewayError};
pub use middleware::ClientIp;
pub use router::{build_router, AppState};
pub use service::ApiGatewayService;
