//! # livebridge
//!
//! Livebridge relay server binary — wires settings, the upstream connector,
//! and the WebSocket server together.

#![deny(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use livebridge_server::config::ServerConfig;
use livebridge_server::metrics::install_recorder;
use livebridge_server::relay::RelayConfig;
use livebridge_server::server::LiveServer;
use livebridge_upstream::{LiveConnector, ScriptedConnector};
use tracing_subscriber::EnvFilter;

/// Livebridge relay server.
#[derive(Parser, Debug)]
#[command(name = "livebridge", about = "Live-stream event relay server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the settings file (defaults to `~/.livebridge/settings.json`).
    #[arg(long)]
    settings_path: Option<PathBuf>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("livebridge=info,livebridge_server=info,info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Settings before logging so nothing is logged under the wrong level.
    let settings_path = args
        .settings_path
        .unwrap_or_else(livebridge_settings::settings_path);
    let settings = livebridge_settings::load_settings_from_path(&settings_path)
        .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;

    init_logging();

    let mut server_config = ServerConfig::from_settings(&settings.server);
    if let Some(host) = args.host {
        server_config.host = host;
    }
    if let Some(port) = args.port {
        server_config.port = port;
    }
    let relay_config = RelayConfig::from_settings(&settings.relay);

    let metrics_handle = install_recorder();

    // The scripted connector ships as the built-in upstream; a service
    // connector plugs in through the same trait.
    let connector: Arc<dyn LiveConnector> = Arc::new(ScriptedConnector::demo());

    let server =
        LiveServer::new(server_config, relay_config, connector).with_metrics(metrics_handle);
    let (addr, handle) = server.listen().await.context("failed to bind server")?;
    tracing::info!("livebridge listening on http://{addr} (ws endpoint at /ws)");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutting down...");
    server.shutdown().graceful_shutdown(vec![handle], None).await;
    tracing::info!("shutdown complete");
    Ok(())
}
