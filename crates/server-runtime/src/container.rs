//! # Subsystem Container
//!
//! Builds each subsystem from the gateway configuration and bundles the
//! inbound ports into the gateway's `AppState`.

use anyhow::{Context, Result};
use mv_01_key_resolver::{HttpKeySetSource, KeyResolverConfig, KeyResolverService};
use mv_02_callback_verification::{
    CallbackVerificationService, CallbackVerifierConfig, SystemTimeSource,
};
use mv_03_check_lifecycle::{CheckLifecycleService, HttpProviderClient, ProviderClientConfig};
use mv_04_api_gateway::{AppState, GatewayConfig};
use std::sync::Arc;
use tracing::info;

/// Build the application state from configuration.
pub fn build_state(config: &GatewayConfig) -> Result<AppState> {
    // Key resolver → callback verifier
    let key_source = HttpKeySetSource::new(&config.provider.base_url, config.timeouts.key_fetch)
        .context("failed to build key set client")?;
    info!(jwks_url = %key_source.url(), "[mv-01] Key resolver configured");
    let resolver = Arc::new(KeyResolverService::new(
        key_source,
        KeyResolverConfig {
            min_refresh_interval: config.callbacks.min_refresh_interval,
        },
    ));

    let verifier = Arc::new(CallbackVerificationService::new(
        resolver,
        SystemTimeSource,
        CallbackVerifierConfig {
            max_clock_skew: config.callbacks.max_clock_skew,
            refresh_on_mismatch: config.callbacks.refresh_on_mismatch,
        },
    ));
    info!("[mv-02] Callback verifier configured");

    // Provider client → check lifecycle
    let provider = HttpProviderClient::new(ProviderClientConfig {
        base_url: config.provider.base_url.clone(),
        client_id: config.provider.client_id.clone(),
        client_secret: config.provider.client_secret.clone(),
        scopes: config.provider.scopes.clone(),
        timeout: config.timeouts.provider,
        connect_timeout: config.timeouts.connect,
    })
    .context("failed to build provider client")?;
    let lifecycle = Arc::new(CheckLifecycleService::new(provider));
    info!(base_url = %config.provider.base_url, "[mv-03] Check lifecycle configured");

    Ok(AppState::new(lifecycle.clone(), lifecycle, verifier))
}
