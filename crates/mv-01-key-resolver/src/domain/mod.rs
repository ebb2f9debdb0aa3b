//! # Domain Layer
//!
//! JWK documents and the key material extracted from them.

pub mod entities;
pub mod errors;
