//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that the callback verifier uses
//! - **Outbound (Driven)**: where key sets come from

pub mod inbound;
pub mod outbound;
