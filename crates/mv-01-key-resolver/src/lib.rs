//! # Key Resolver Subsystem (MV-01)
//!
//! Resolves the public keys that sign provider callbacks.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): JWK parsing into typed key material, no I/O
//! - **Ports Layer** (`ports/`): `KeyResolverApi` (inbound), `KeySetSource` (outbound)
//! - **Adapters** (`adapters/`): HTTP fetch of `{base_url}/.well-known/jwks.json`
//! - **Service Layer** (`service.rs`): in-memory cache with single-flight fetch
//!
//! ## Cache Semantics
//!
//! - A hit never touches the network.
//! - A miss always fetches; there is no negative cache, so a rotated key set
//!   is picked up on first use of the new key id.
//! - A successful fetch replaces the cached set wholesale. A failed fetch
//!   leaves the cache exactly as it was.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::http::HttpKeySetSource;
pub use domain::entities::{Jwk, JwkSet, KeyMaterial, SigningKey};
pub use domain::errors::KeyResolutionError;
pub use ports::inbound::KeyResolverApi;
pub use ports::outbound::KeySetSource;
pub use service::{KeyResolverConfig, KeyResolverService};
