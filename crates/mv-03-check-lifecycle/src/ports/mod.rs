//! # Ports Layer
//!
//! - **Inbound (Driving)**: check and coverage APIs the HTTP boundary calls
//! - **Outbound (Driven)**: the provider's REST API

pub mod inbound;
pub mod outbound;
