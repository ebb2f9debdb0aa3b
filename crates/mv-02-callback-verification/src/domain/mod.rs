//! # Domain Layer
//!
//! HTTP-signature envelope handling with no I/O dependencies.

pub mod algorithm;
pub mod digest;
pub mod envelope;
pub mod errors;
pub mod freshness;
pub mod params;
pub mod signing_string;
