//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::SigningKey;
use crate::domain::errors::KeyResolutionError;
use std::sync::Arc;

/// Key lookup by key id.
#[async_trait::async_trait]
pub trait KeyResolverApi: Send + Sync {
    /// Return the key for `key_id`, fetching the key set on a miss.
    ///
    /// # Errors
    /// * `KeyResolutionError::KeyNotFound` - the current key set does not list `key_id`
    /// * `KeyResolutionError::KeyFetch` - the key set could not be fetched or parsed
    async fn resolve(&self, key_id: &str) -> Result<Arc<SigningKey>, KeyResolutionError>;

    /// Force a re-fetch before returning the key, unless a fetch happened
    /// within the configured cooldown, in which case the cached entry is used.
    ///
    /// Intended for a verifier that suspects the cached material is stale.
    async fn refresh(&self, key_id: &str) -> Result<Arc<SigningKey>, KeyResolutionError>;

    /// Key ids currently cached.
    fn cached_key_ids(&self) -> Vec<String>;
}
