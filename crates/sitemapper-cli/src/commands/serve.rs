//! `serve` command: run the HTTP service until Ctrl-C.

use anyhow::{Context, Result};
use sitemapper_core::Config;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::CliError;
use crate::server::{AppState, router};

/// Bind the service and serve requests until interrupted.
pub async fn execute(bind: Option<String>, mut config: Config) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let state = AppState::from_config(&config)?;
    let listener = TcpListener::bind(config.server.bind.as_str())
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))
        .map_err(CliError::usage)?;

    let addr = listener.local_addr()?;
    info!(%addr, "sitemapper listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; shutting down");
        return;
    }
    info!("Shutdown requested, draining connections");
}
