//! # Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::JwkSet;
use crate::domain::errors::KeyResolutionError;

/// Source of the provider's key set document.
#[async_trait::async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the complete, current key set.
    ///
    /// # Errors
    /// * `KeyResolutionError::KeyFetch` - transport failure, timeout, non-2xx,
    ///   or a body that is not a JWK Set
    async fn fetch_key_set(&self) -> Result<JwkSet, KeyResolutionError>;
}
