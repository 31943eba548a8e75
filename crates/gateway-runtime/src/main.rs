//! # Node Gateway
//!
//! Entry point for the control-plane gateway of a containerized beacon /
//! validator node.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG`, default `info`)
//! 2. Load configuration (`$GATEWAY_CONFIG`, then `GATEWAY_*` overrides)
//! 3. Validate and wire the gateway (proxy, supervisor client, settings)
//! 4. Serve on `http.host:http.port` until Ctrl+C

mod config;

use anyhow::{Context, Result};
use ng_02_api_gateway::GatewayService;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = config::load_config()?;
    info!(
        network = %config.node.network,
        rest_url = %config.upstreams.rest_url,
        keymanager_url = %config.upstreams.keymanager_url,
        supervisor = %config.supervisor_endpoint().url(),
        "Starting node gateway"
    );

    let service = GatewayService::new(config).context("invalid gateway configuration")?;
    service
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Cannot listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            info!("Shutdown requested");
        })
        .await?;

    Ok(())
}
