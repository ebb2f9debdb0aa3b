//! # Ports Layer
//!
//! - **Inbound (Driving)**: API the HTTP boundary calls per callback
//! - **Outbound (Driven)**: signature primitives and the clock

pub mod inbound;
pub mod outbound;
