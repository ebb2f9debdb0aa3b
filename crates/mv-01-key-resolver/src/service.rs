//! # Key Resolver Service
//!
//! Implements `KeyResolverApi` over any `KeySetSource`.
//!
//! ## Concurrency
//!
//! Reads take a `parking_lot::RwLock` read guard and never await. Fetches are
//! serialised through one async gate: a resolver that finds the gate busy
//! waits, then checks whether a fetch completed in the meantime and reuses
//! it instead of fetching again.

use crate::domain::entities::SigningKey;
use crate::domain::errors::KeyResolutionError;
use crate::ports::inbound::KeyResolverApi;
use crate::ports::outbound::KeySetSource;
use mv_telemetry::KEY_SET_FETCHES;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tuning for the resolver.
#[derive(Debug, Clone)]
pub struct KeyResolverConfig {
    /// Minimum spacing between forced refreshes.
    pub min_refresh_interval: Duration,
}

impl Default for KeyResolverConfig {
    fn default() -> Self {
        Self {
            min_refresh_interval: Duration::from_secs(30),
        }
    }
}

/// Caching key resolver bound to one key set source.
pub struct KeyResolverService<S: KeySetSource> {
    source: S,
    config: KeyResolverConfig,
    cache: RwLock<HashMap<String, Arc<SigningKey>>>,
    fetch_gate: tokio::sync::Mutex<()>,
    /// Bumped after every successful fetch.
    generation: AtomicU64,
    fetch_attempts: AtomicU64,
    last_attempt: Mutex<Option<Instant>>,
}

impl<S: KeySetSource> KeyResolverService<S> {
    pub fn new(source: S, config: KeyResolverConfig) -> Self {
        Self {
            source,
            config,
            cache: RwLock::new(HashMap::new()),
            fetch_gate: tokio::sync::Mutex::new(()),
            generation: AtomicU64::new(0),
            fetch_attempts: AtomicU64::new(0),
            last_attempt: Mutex::new(None),
        }
    }

    /// Number of times the source has been asked for the key set.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_attempts.load(Ordering::Acquire)
    }

    fn lookup(&self, key_id: &str) -> Option<Arc<SigningKey>> {
        self.cache.read().get(key_id).cloned()
    }

    fn lookup_or_not_found(&self, key_id: &str) -> Result<Arc<SigningKey>, KeyResolutionError> {
        self.lookup(key_id)
            .ok_or_else(|| KeyResolutionError::KeyNotFound(key_id.to_string()))
    }

    /// Fetch and install a new key set. Caller must hold the fetch gate.
    async fn fetch_and_store(&self) -> Result<(), KeyResolutionError> {
        self.fetch_attempts.fetch_add(1, Ordering::AcqRel);
        *self.last_attempt.lock() = Some(Instant::now());

        let key_set = match self.source.fetch_key_set().await {
            Ok(set) => set,
            Err(e) => {
                KEY_SET_FETCHES.with_label_values(&["failure"]).inc();
                tracing::warn!(error = %e, "key set fetch failed, keeping cached keys");
                return Err(e);
            }
        };

        let keys = key_set.signing_keys();
        let count = keys.len();
        *self.cache.write() = keys;
        self.generation.fetch_add(1, Ordering::AcqRel);
        KEY_SET_FETCHES.with_label_values(&["success"]).inc();
        tracing::info!(keys = count, "key set refreshed");
        Ok(())
    }

    fn within_cooldown(&self) -> bool {
        match *self.last_attempt.lock() {
            Some(at) => at.elapsed() < self.config.min_refresh_interval,
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl<S: KeySetSource> KeyResolverApi for KeyResolverService<S> {
    async fn resolve(&self, key_id: &str) -> Result<Arc<SigningKey>, KeyResolutionError> {
        if let Some(key) = self.lookup(key_id) {
            return Ok(key);
        }

        let observed = self.generation.load(Ordering::Acquire);
        let _gate = self.fetch_gate.lock().await;

        // Someone else fetched while we waited: that fetch started after our
        // miss, so its answer is current enough.
        if self.generation.load(Ordering::Acquire) != observed {
            return self.lookup_or_not_found(key_id);
        }

        tracing::debug!(key_id, "key id not cached, fetching key set");
        self.fetch_and_store().await?;
        self.lookup_or_not_found(key_id)
    }

    async fn refresh(&self, key_id: &str) -> Result<Arc<SigningKey>, KeyResolutionError> {
        let observed = self.generation.load(Ordering::Acquire);
        let _gate = self.fetch_gate.lock().await;

        if self.generation.load(Ordering::Acquire) != observed || self.within_cooldown() {
            tracing::debug!(key_id, "refresh skipped, key set is recent");
            return self.lookup_or_not_found(key_id);
        }

        self.fetch_and_store().await?;
        self.lookup_or_not_found(key_id)
    }

    fn cached_key_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.cache.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Jwk, JwkSet, KeyMaterial};
    use async_trait::async_trait;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use base64::Engine;
    use std::collections::VecDeque;

    // =========================================================================
    // Scripted KeySetSource
    // =========================================================================

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<JwkSet, KeyResolutionError>>>,
        calls: AtomicU64,
        delay: Duration,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<JwkSet, KeyResolutionError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU64::new(0),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeySetSource for Arc<ScriptedSource> {
        async fn fetch_key_set(&self) -> Result<JwkSet, KeyResolutionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.responses
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(KeyResolutionError::KeyFetch("script exhausted".into())))
        }
    }

    fn key_set(entries: &[(&str, u8)]) -> JwkSet {
        JwkSet {
            keys: entries
                .iter()
                .map(|(kid, fill)| Jwk {
                    kty: "OKP".into(),
                    kid: Some((*kid).into()),
                    crv: Some("Ed25519".into()),
                    x: Some(URL_SAFE_NO_PAD.encode([*fill; 32])),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn resolver(
        source: &Arc<ScriptedSource>,
        cooldown: Duration,
    ) -> KeyResolverService<Arc<ScriptedSource>> {
        KeyResolverService::new(
            Arc::clone(source),
            KeyResolverConfig {
                min_refresh_interval: cooldown,
            },
        )
    }

    #[tokio::test]
    async fn test_miss_fetches_once_then_hits_cache() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(key_set(&[("k1", 1)]))]));
        let service = resolver(&source, Duration::from_secs(30));

        let first = service.resolve("k1").await.unwrap();
        let second = service.resolve("k1").await.unwrap();

        assert_eq!(source.calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(service.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_key_after_fetch_is_not_found() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(key_set(&[("k1", 1)]))]));
        let service = resolver(&source, Duration::from_secs(30));

        let err = service.resolve("other").await.unwrap_err();
        assert_eq!(err, KeyResolutionError::KeyNotFound("other".into()));
    }

    #[tokio::test]
    async fn test_no_negative_cache_rotated_key_found() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(key_set(&[("old", 1)])),
            Ok(key_set(&[("new", 2)])),
        ]));
        let service = resolver(&source, Duration::from_secs(30));

        assert!(service.resolve("new").await.is_err());
        let key = service.resolve("new").await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(key.material, KeyMaterial::Ed25519 { public: [2; 32] });
        // Wholesale replacement: the rotated-out key is gone
        assert_eq!(service.cached_key_ids(), vec!["new".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_cache() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(key_set(&[("k1", 1)])),
            Err(KeyResolutionError::KeyFetch("503".into())),
        ]));
        let service = resolver(&source, Duration::from_secs(30));

        service.resolve("k1").await.unwrap();
        let err = service.resolve("k2").await.unwrap_err();

        assert!(matches!(err, KeyResolutionError::KeyFetch(_)));
        assert!(service.resolve("k1").await.is_ok());
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let mut scripted = ScriptedSource::new(vec![Ok(key_set(&[("k1", 1)]))]);
        scripted.delay = Duration::from_millis(50);
        let source = Arc::new(scripted);
        let service = Arc::new(resolver(&source, Duration::from_secs(30)));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = Arc::clone(&service);
                tokio::spawn(async move { service.resolve("k1").await })
            })
            .collect();
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_respects_cooldown() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(key_set(&[("k1", 1)])),
            Ok(key_set(&[("k1", 9)])),
        ]));
        let service = resolver(&source, Duration::from_secs(3600));

        service.resolve("k1").await.unwrap();
        let refreshed = service.refresh("k1").await.unwrap();

        assert_eq!(source.calls(), 1);
        assert_eq!(refreshed.material, KeyMaterial::Ed25519 { public: [1; 32] });
    }

    #[tokio::test]
    async fn test_refresh_picks_up_new_material() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(key_set(&[("k1", 1)])),
            Ok(key_set(&[("k1", 9)])),
        ]));
        let service = resolver(&source, Duration::ZERO);

        service.resolve("k1").await.unwrap();
        let refreshed = service.refresh("k1").await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(refreshed.material, KeyMaterial::Ed25519 { public: [9; 32] });
    }
}
