//! # Callback Verification Service
//!
//! Implements `CallbackVerificationApi`.
//!
//! ## Pipeline
//!
//! 1. Parse the signature parameters and the declared algorithm
//! 2. Rebuild the signing string from the request
//! 3. Check the body digest and the freshness window
//! 4. Resolve the key (a miss fetches the current key set)
//! 5. Verify with the first scheme that accepts the algorithm and key
//! 6. On a mismatch, optionally refresh the key once and retry if the
//!    material actually changed

use crate::adapters::default_schemes;
use crate::domain::algorithm::SignatureAlgorithm;
use crate::domain::envelope::CallbackEnvelope;
use crate::domain::errors::CallbackError;
use crate::domain::params::SignatureParams;
use crate::domain::{digest, freshness, signing_string};
use crate::ports::inbound::{CallbackVerificationApi, VerificationOutcome};
use crate::ports::outbound::{SignatureScheme, TimeSource};
use mv_01_key_resolver::{KeyResolverApi, SigningKey};
use mv_telemetry::{CALLBACKS_RECEIVED, CALLBACK_REJECTIONS};
use std::sync::Arc;
use std::time::Duration;

/// Verifier settings.
#[derive(Debug, Clone)]
pub struct CallbackVerifierConfig {
    /// Tolerated difference between the signed `Date` and local time
    pub max_clock_skew: Duration,
    /// Re-fetch the key once when a known key fails to verify
    pub refresh_on_mismatch: bool,
}

impl Default for CallbackVerifierConfig {
    fn default() -> Self {
        Self {
            max_clock_skew: Duration::from_secs(300),
            refresh_on_mismatch: true,
        }
    }
}

/// Callback Verification Service.
pub struct CallbackVerificationService<T: TimeSource> {
    resolver: Arc<dyn KeyResolverApi>,
    schemes: Vec<Box<dyn SignatureScheme>>,
    clock: T,
    config: CallbackVerifierConfig,
}

impl<T: TimeSource> CallbackVerificationService<T> {
    /// Create a verifier with the RSA and Ed25519 schemes.
    ///
    /// # Arguments
    /// * `resolver` - key lookup, shared with nothing else that mutates it
    /// * `clock` - time source for the freshness window
    pub fn new(resolver: Arc<dyn KeyResolverApi>, clock: T, config: CallbackVerifierConfig) -> Self {
        Self::with_schemes(resolver, clock, config, default_schemes())
    }

    pub fn with_schemes(
        resolver: Arc<dyn KeyResolverApi>,
        clock: T,
        config: CallbackVerifierConfig,
        schemes: Vec<Box<dyn SignatureScheme>>,
    ) -> Self {
        Self {
            resolver,
            schemes,
            clock,
            config,
        }
    }

    /// Run the pipeline, returning the key id on success.
    ///
    /// # Errors
    /// Any `CallbackError`; all of them mean "reject".
    pub async fn check(&self, envelope: &CallbackEnvelope) -> Result<String, CallbackError> {
        let params = SignatureParams::from_envelope(envelope)?;
        let algorithm = SignatureAlgorithm::parse(params.algorithm.as_deref())?;
        let signing_string = signing_string::build(envelope, &params)?;

        digest::verify_body_digest(envelope, &params)?;
        let max_skew = i64::try_from(self.config.max_clock_skew.as_secs()).unwrap_or(i64::MAX);
        freshness::check_freshness(envelope, &params, self.clock.now(), max_skew)?;

        let key = self.resolver.resolve(&params.key_id).await?;
        let message = signing_string.as_bytes();

        match self.verify_with(&key, algorithm, message, &params.signature) {
            Err(CallbackError::SignatureMismatch) if self.config.refresh_on_mismatch => {
                let fresh = match self.resolver.refresh(&params.key_id).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        tracing::debug!(key_id = %params.key_id, error = %e, "key refresh after mismatch failed");
                        return Err(CallbackError::SignatureMismatch);
                    }
                };
                if fresh.material == key.material {
                    return Err(CallbackError::SignatureMismatch);
                }
                tracing::info!(key_id = %params.key_id, "key material rotated, retrying verification");
                self.verify_with(&fresh, algorithm, message, &params.signature)?;
            }
            other => other?,
        }

        Ok(params.key_id)
    }

    fn verify_with(
        &self,
        key: &SigningKey,
        algorithm: SignatureAlgorithm,
        message: &[u8],
        signature: &[u8],
    ) -> Result<(), CallbackError> {
        let scheme = self
            .schemes
            .iter()
            .find(|s| s.accepts(algorithm, &key.material))
            .ok_or_else(|| CallbackError::AlgorithmMismatch {
                algorithm: algorithm.to_string(),
                key_type: key.material.key_type().to_string(),
            })?;

        if scheme.verify(message, signature, &key.material) {
            Ok(())
        } else {
            Err(CallbackError::SignatureMismatch)
        }
    }
}

#[async_trait::async_trait]
impl<T: TimeSource> CallbackVerificationApi for CallbackVerificationService<T> {
    async fn verify(&self, envelope: &CallbackEnvelope) -> VerificationOutcome {
        match self.check(envelope).await {
            Ok(key_id) => {
                CALLBACKS_RECEIVED.with_label_values(&["accepted"]).inc();
                tracing::info!(key_id = %key_id, "callback signature verified");
                VerificationOutcome::accepted(key_id)
            }
            Err(e) => {
                let reason = e.reason();
                CALLBACKS_RECEIVED.with_label_values(&["rejected"]).inc();
                CALLBACK_REJECTIONS.with_label_values(&[reason]).inc();
                tracing::warn!(reason, error = %e, "callback rejected");
                let key_id = SignatureParams::from_envelope(envelope)
                    .ok()
                    .map(|p| p.key_id);
                VerificationOutcome::rejected(key_id, reason)
            }
        }
    }
}
