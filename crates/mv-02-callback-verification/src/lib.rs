//! # Callback Verification Subsystem (MV-02)
//!
//! Decides whether an inbound provider callback is authentic.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): envelope parsing, signing-string
//!   reconstruction, digest and freshness checks. Pure, no I/O.
//! - **Ports Layer** (`ports/`): `CallbackVerificationApi` (inbound);
//!   `SignatureScheme` and `TimeSource` (outbound). Keys come from
//!   `mv_01_key_resolver::KeyResolverApi`.
//! - **Adapters** (`adapters/`): RSA PKCS#1 v1.5 SHA-256 via `ring`, Ed25519
//!   via `ed25519-dalek`.
//! - **Service Layer** (`service.rs`): the verification pipeline.
//!
//! ## Security Notes
//!
//! - Every failure is a rejection. Callers see only accepted/rejected; the
//!   reason goes to logs and metrics.
//! - Cheap checks (envelope shape, digest, clock skew) run before any key
//!   lookup so malformed traffic cannot drive key-set fetches.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Signing helpers and fixed clocks.
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{Ed25519Scheme, RsaSha256Scheme};
pub use domain::algorithm::SignatureAlgorithm;
pub use domain::envelope::CallbackEnvelope;
pub use domain::errors::CallbackError;
pub use domain::params::SignatureParams;
pub use ports::inbound::{CallbackVerificationApi, VerificationOutcome};
pub use ports::outbound::{SignatureScheme, SystemTimeSource, TimeSource};
pub use service::{CallbackVerificationService, CallbackVerifierConfig};
