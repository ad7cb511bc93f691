//! ModSecurity gate (v1)
//!
//! A standalone inspection proxy built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 MODSEC GATE                  │
//!   Client Request     │  ┌────────┐   ┌──────────┐   ┌───────────┐   │
//!   ───────────────────┼─▶│  http  │──▶│   gate   │──▶│ upstream  │───┼──▶ Upstream
//!                      │  │ server │   │ inspect  │   │  forward  │   │
//!                      │  └────────┘   └────┬─────┘   └───────────┘   │
//!                      │                    │ mirrored request         │
//!                      │                    ▼                          │
//!                      │             ┌─────────────┐                   │
//!                      │             │  verdict    │───────────────────┼──▶ ModSecurity
//!                      │             │  transport  │                   │
//!                      │             └─────────────┘                   │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use modsec_gate::config::{read_config, validate_config, GateServerConfig};
use modsec_gate::http::HttpServer;
use modsec_gate::lifecycle::{wait_for_signal, Shutdown};
use modsec_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "modsec-gate")]
#[command(about = "Inline ModSecurity inspection gate", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with the plugin's field names).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(long)]
    listen: Option<String>,

    /// Override upstream.url.
    #[arg(long)]
    upstream: Option<String>,

    /// Override modsecurity.modsecurity_url.
    #[arg(long)]
    modsecurity_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => GateServerConfig::default(),
    };
    if let Some(listen) = cli.listen {
        config.listener.bind_address = listen;
    }
    if let Some(upstream) = cli.upstream {
        config.upstream.url = upstream;
    }
    if let Some(url) = cli.modsecurity_url {
        config.modsecurity.modsecurity_url = url;
    }
    validate_config(&config).map_err(modsec_gate::config::ConfigError::Validation)?;

    logging::init_logging(&config.observability)?;

    tracing::info!("modsec-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        modsecurity_url = %config.modsecurity.modsecurity_url,
        max_body_size = config.modsecurity.max_body_size,
        interrupt_on_error = config.modsecurity.interrupt_on_error,
        ignore_500_error = config.modsecurity.ignore_500_error,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
