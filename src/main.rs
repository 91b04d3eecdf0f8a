//! Edge guard server binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌────────────────────────────────────────────┐
//!                     │                EDGE GUARD                   │
//!                     │                                             │
//!   Client Request    │  ┌─────────┐   ┌───────────┐   ┌────────┐  │
//!   ──────────────────┼─▶│  http   │──▶│   guard   │──▶│  app   │  │
//!                     │  │ server  │   │orchestrator│  │handler │  │
//!                     │  └─────────┘   └─────┬─────┘   └────────┘  │
//!                     │                      │                      │
//!                     │        ┌─────────────┼─────────────┐        │
//!                     │        ▼             ▼             ▼        │
//!                     │  ┌──────────┐  ┌──────────┐  ┌──────────┐  │
//!                     │  │classifier│  │rate_limit│  │  ledger  │  │
//!                     │  │          │  │ + sweep  │  │+block set│  │
//!                     │  └──────────┘  └──────────┘  └──────────┘  │
//!                     │        ┌──────────┐  ┌──────────┐          │
//!                     │        │   csrf   │  │ headers  │          │
//!                     │        └──────────┘  └──────────┘          │
//!                     │                                             │
//!                     │  Cross-cutting: config, observability       │
//!                     └────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use edge_guard::config::{load_config, GuardConfig};
use edge_guard::http::GuardServer;
use edge_guard::observability;

#[derive(Parser)]
#[command(name = "edge-guard", about = "HTTP request admission guard")]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GuardConfig::default(),
    };

    observability::logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        default_limit = config.rate_limit.default_limit,
        default_window_secs = config.rate_limit.default_window_secs,
        escalation_threshold = config.escalation.threshold,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let server = GuardServer::new(config);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
