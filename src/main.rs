//! route-dispatch server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum listener ──▶ middleware ──▶ HostRouter ──▶ Router ──▶ handler
//!                     (http/server)    (request id,    (Host header)  (path,
//!                                       trace, timeout)                method)
//! ```
//!
//! Routes come from a TOML file; every configured route answers with an
//! echo of what it matched.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use route_dispatch::config::{load_config, ServerConfig};
use route_dispatch::http::HttpServer;
use route_dispatch::lifecycle::{build_routers, signals, Shutdown};
use route_dispatch::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "route-dispatch")]
#[command(about = "Pattern-based HTTP request router", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init(&config.observability.log_level);
    tracing::info!("route-dispatch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        routes = config.routes.len(),
        hosts = config.hosts.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let handler = build_routers(&config)?.into_handler();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::from_shared(config, handler);
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::shutdown_signal().await;
    tracing::info!("Shutdown requested");
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
