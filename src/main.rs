//! # Islamic Content Gateway - Main Entry Point
//!
//! Loads configuration, installs logging and metrics, wires the services and
//! serves the HTTP API until SIGINT or SIGTERM.
//!
//! Configuration comes from the YAML file named by `CONTENT_API_CONFIG_PATH`
//! (default `config/content-api.yaml`), overridden by `CONTENT_API_*`
//! environment variables.

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};

use islamic_content_gateway::api::ContentServer;
use islamic_content_gateway::observability::{init_logging, Metrics};
use islamic_content_gateway::{AppConfig, AppContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()
        .await
        .context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to initialize logging")?;

    info!("🚀 Starting Islamic Content Gateway");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let metrics = match Metrics::install() {
        Ok(metrics) => Some(metrics),
        Err(e) => {
            warn!(error = %e, "Metrics recorder unavailable, /metrics disabled");
            None
        }
    };

    let context = AppContext::from_config(&config).context("failed to build services")?;
    info!(
        cache = context.cache.backend(),
        mirror = context.mirror.health.backend(),
        quran_api = %config.quran.base_url,
        hadith_api = %config.hadith.base_url,
        "✅ Services ready"
    );

    let server = ContentServer::new(context.into_state(metrics), &config.server)
        .context("failed to configure HTTP server")?;

    if let Err(e) = server.serve(shutdown_signal()).await {
        error!("Server error: {}", e);
        return Err(e.into());
    }

    info!("✅ Content gateway shutdown complete");
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM where available
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("📡 Received SIGINT (Ctrl+C), initiating graceful shutdown..."),
        _ = terminate => info!("📡 Received SIGTERM, initiating graceful shutdown..."),
    }
}
