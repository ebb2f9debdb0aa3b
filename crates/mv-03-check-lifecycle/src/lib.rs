//! # Check Lifecycle Subsystem (MV-03)
//!
//! Creates verification checks with the provider and projects provider
//! responses into the views clients receive.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): provider response model, client views, errors
//! - **Ports Layer** (`ports/`): `CheckLifecycleApi` and `CoverageApi` (inbound),
//!   `ProviderClient` (outbound)
//! - **Adapters** (`adapters/`): OAuth2-authenticated REST client
//! - **Service Layer** (`service.rs`): validation, provider calls, projection
//!
//! ## Error Policy
//!
//! Input is validated before any provider call. Provider failures are logged
//! with their structured payload and surface as an opaque `CheckError::Provider`.
//!
//! The provider owns check state. Nothing here stores or advances it.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http::{HttpProviderClient, ProviderClientConfig};
pub use domain::errors::{CheckError, ProviderError};
pub use domain::model::{Link, ProviderCheck, ProviderLinks};
pub use domain::views::{
    CheckCreated, DeviceCoverage, PhoneCheckStatus, SimCheckResult, SubscriberCheckStatus,
};
pub use ports::inbound::{CheckLifecycleApi, CoverageApi};
pub use ports::outbound::ProviderClient;
pub use service::CheckLifecycleService;
