//! # Adapters
//!
//! Concrete `ProviderClient` implementations.

pub mod http;
