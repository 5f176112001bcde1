//! Review proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────┐
//!                     │                 REVIEW PROXY                  │
//!   Client Request    │  ┌────────┐   ┌──────┐   ┌────────────────┐  │
//!   ──────────────────┼─▶│  http  │──▶│ auth │──▶│ review handler │  │
//!                     │  │ server │   │ jwt  │   │ validate/owner │  │
//!                     │  └────────┘   └──────┘   └───────┬────────┘  │
//!                     │                                   │           │
//!   Client Response   │                           ┌───────▼────────┐  │    Review /
//!   ◀─────────────────┼───────────────────────────│ upstream client│◀─┼──▶ Inventory
//!                     │                           └────────────────┘  │     API
//!                     │  config · observability · lifecycle           │
//!                     └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use review_proxy::config::loader::{load_config, load_dotenv};
use review_proxy::http::HttpServer;
use review_proxy::lifecycle::{signals, Shutdown};
use review_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "review-proxy")]
#[command(about = "Backend-for-frontend for product reviews", long_about = None)]
struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "REVIEW_PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init_logging(&config.observability)?;

    tracing::info!("review-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        signals::terminate().await;
        trigger.trigger();
    });

    HttpServer::new(config)?
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
