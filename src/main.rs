//! crawler-relay
//!
//! Fetches `/pages/<url>` on the caller's behalf, presenting a crawler
//! `User-Agent`, and streams the upstream response back.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request        ┌──────────────────────────────────────────────┐
//!     ──────────────────────┼─▶ http::server ─▶ relay::target (normalize)  │
//!                           │                          │                   │
//!                           │                          ▼                   │
//!     Client Response       │                   relay::executor            │
//!     ◀─────────────────────┼── http::response ◀── relay::transport ◀──────┼──── Upstream
//!                           │                                              │
//!                           │   config · observability · lifecycle         │
//!                           └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use crawler_relay::config::{load_config, validate_config, ConfigError, RelayConfig};
use crawler_relay::observability::init_logging;
use crawler_relay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "crawler-relay")]
#[command(about = "Relay web pages fetched with a crawler identity", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long)]
    addr: Option<String>,

    /// Port to listen on.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    config.apply_overrides(cli.addr, cli.port);

    init_logging(&config.observability);

    if let Err(errors) = validate_config(&config) {
        let err = ConfigError::Validation(errors);
        tracing::error!(error = %err, "Invalid configuration");
        return Err(err.into());
    }

    tracing::info!("crawler-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let listener = TcpListener::bind(config.listener.bind_address()).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_termination();

    let server = HttpServer::new()?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
