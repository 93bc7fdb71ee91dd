mod config;
mod error;
mod http;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use roster_core::app::{AppBuilder, default_seed};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    logging::init(config.log_format)?;

    // 起動のたびに store をデモデータでリセットする（--no-seed で無効）
    let mut builder = AppBuilder::new();
    if !config.no_seed {
        builder = builder.seed(default_seed());
    }
    let app = builder
        .build()
        .await
        .context("failed to start record service")?;

    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    info!(addr = %config.bind, seeded = !config.no_seed, "roster-server listening");

    axum::serve(listener, http::router(app.service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
