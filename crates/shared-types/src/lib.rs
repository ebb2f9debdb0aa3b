//! # Shared Types Crate
//!
//! Value types passed between subsystems.
//!
//! ## Design Principles
//!
//! - **Validated at construction**: a `PhoneNumber` or `CheckId` that exists
//!   is never empty, so downstream code does not re-check.
//! - **Provider is authoritative**: `CheckState` is only ever derived from a
//!   provider response, never advanced locally.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
