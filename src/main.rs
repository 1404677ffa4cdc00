//! Gatekeeper service entry point.
//!
//! Loads the immutable configuration, initializes tracing and metrics, builds
//! the counter store, and runs the HTTP server until shutdown.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nurogate::apikeys::MemoryKeyStore;
use nurogate::config::{load_config, GateConfig};
use nurogate::http::HttpServer;
use nurogate::observability::metrics;
use nurogate::store::build_kv_store;

#[derive(Parser, Debug)]
#[command(name = "nurogate", version, about = "Request gatekeeper service")]
struct Args {
    /// Path to a TOML configuration file (defaults used when omitted).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nurogate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "nurogate starting");

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GateConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_requests = config.security.max_requests,
        rate_limit_window_secs = config.security.rate_limit_window_secs,
        block_duration_secs = config.security.block_duration_secs,
        store_backend = ?config.store.backend,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                error = %e,
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let kv = build_kv_store(&config.store).await;
    let keys = Arc::new(MemoryKeyStore::new());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, kv, keys);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
