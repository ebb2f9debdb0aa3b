//! # Adapters
//!
//! Concrete `SignatureScheme` implementations.

mod ed25519;
mod rsa;

pub use ed25519::Ed25519Scheme;
pub use rsa::RsaSha256Scheme;

use crate::ports::outbound::SignatureScheme;

/// Every scheme this crate ships, in lookup order.
pub fn default_schemes() -> Vec<Box<dyn SignatureScheme>> {
    vec![Box::new(RsaSha256Scheme), Box::new(Ed25519Scheme)]
}
