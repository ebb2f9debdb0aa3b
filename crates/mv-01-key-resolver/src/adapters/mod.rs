//! # Adapters
//!
//! Concrete `KeySetSource` implementations.

pub mod http;
