//! # Mobile-Verify Server
//!
//! Entry point. See the library docs for the startup sequence.

use anyhow::{Context, Result};
use mv_04_api_gateway::ApiGatewayService;
use mv_telemetry::{init_telemetry, TelemetryConfig};
use server_runtime::{build_state, load_config};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::from_env())?;

    let config = load_config().context("failed to load configuration")?;

    info!("===========================================");
    info!("  Mobile-Verify v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        addr = %config.http_addr(),
        provider = %config.provider.base_url,
        basic_auth = config.basic_auth.is_enabled(),
        static_dir = ?config.static_files.enabled.then_some(&config.static_files.dir),
        "configuration loaded"
    );

    let state = build_state(&config)?;
    let gateway = ApiGatewayService::new(config, state)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
        }
        info!("Initiating graceful shutdown...");
    };

    info!("Server is running. Press Ctrl+C to stop.");
    gateway.serve(shutdown).await?;

    info!("Shutdown complete");
    Ok(())
}
