//! # Domain Layer

pub mod errors;
pub mod model;
pub mod views;
