//! `lca-server` binary

use anyhow::Context;
use clap::Parser;
use lca_server::{routes, telemetry, AppState, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use warp::Filter;

/// Metal lifecycle assessment service
#[derive(Debug, Parser)]
#[command(name = "lca-server", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(long, value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Result snapshot file
    #[arg(long, value_name = "FILE")]
    storage: Option<PathBuf>,

    /// Keep results in memory only
    #[arg(long)]
    ephemeral: bool,

    /// Emit JSON log lines
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(addr) = self.bind {
            config = config.with_bind_address(addr);
        }
        if let Some(path) = &self.storage {
            config = config.with_storage_path(path.clone());
        }
        if self.ephemeral {
            config = config.with_ephemeral(true);
        }
        if self.log_json {
            config = config.with_log_json(true);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ServerConfig::load(cli.config.as_deref())?.apply_env()?;
    let config = cli.apply(config);

    telemetry::init(config.log_json).map_err(|e| anyhow::anyhow!(e))?;
    tracing::debug!(?config, "Loaded configuration");

    let state = Arc::new(AppState::from_config(&config).context("failed to initialise state")?);
    let api = routes(state).with(warp::trace::request());

    let (addr, server) = warp::serve(api)
        .try_bind_with_graceful_shutdown(config.bind_address, async {
            if tokio::signal::ctrl_c().await.is_err() {
                tracing::warn!("Failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("failed to bind {}", config.bind_address))?;

    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "LCA server listening");
    server.await;
    tracing::info!("LCA server stopped");
    Ok(())
}
