//! Proxify HTTP relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────┐
//!                          │                     PROXIFY                      │
//!   POST /proxify          │  ┌────────┐   ┌────────────┐   ┌─────────────┐   │
//!   ───────────────────────┼─▶│  http  │──▶│ descriptor │──▶│  transport  │   │
//!                          │  │ server │   │  validate  │   │direct/http/ │   │
//!                          │  └────────┘   └────────────┘   │   socks5    │   │
//!                          │                                └──────┬──────┘   │
//!                          │                                       ▼          │
//!   200 bytes | envelope   │  ┌────────┐   ┌────────────┐   ┌─────────────┐   │
//!   ◀──────────────────────┼──│encoder │◀──│ forwarder  │◀──│  assembler  │   │
//!                          │  └────────┘   │ (deadline) │   └─────────────┘   │
//!                          │               └─────┬──────┘                     │
//!                          └─────────────────────┼────────────────────────────┘
//!                                                ▼
//!                                         upstream / proxy
//! ```

use std::path::PathBuf;

use clap::Parser;
use proxify::config;
use proxify::lifecycle::startup;
use proxify::observability::logging;

#[derive(Parser)]
#[command(name = "proxify")]
#[command(about = "HTTP relay that performs described requests on behalf of callers", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding config and environment
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = config::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validation::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init_tracing(&config.observability.log_level);

    tracing::info!("proxify v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream_secs = config.timeouts.upstream_secs,
        request_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
