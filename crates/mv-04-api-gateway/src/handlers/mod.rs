//! Route handlers.

pub mod callbacks;
pub mod checks;
pub mod coverage;
pub mod ops;
