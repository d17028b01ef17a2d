//! Snapshot relay for PlantSight.
//!
//! Accepts the publisher's snapshot stream and any number of viewer
//! connections, fanning each snapshot frame out to all other peers.

use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use plantsight_common::init_tracing;
use plantsight_relay::{RelayConfig, RelayServer};

/// Snapshot relay server.
#[derive(Parser, Debug)]
#[command(name = "plantsight-relay")]
#[command(about = "Fan snapshot frames out to connected viewers")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// Listen address (overrides config).
    #[arg(long)]
    listen: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        RelayConfig::load_from_file(config_path)?
    } else {
        RelayConfig::default()
    };

    if let Some(listen) = args.listen {
        config.listen = listen;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!("Starting PlantSight snapshot relay");

    let server = RelayServer::bind(&config.listen).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(shutdown_rx).await {
            error!("Relay error: {}", e);
        }
    });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = tokio::signal::unix::signal(
                    tokio::signal::unix::SignalKind::terminate()
                ).expect("failed to install SIGTERM handler");
                sigterm.recv().await;
            }
            #[cfg(not(unix))]
            {
                std::future::pending::<()>().await;
            }
        } => {
            info!("Received SIGTERM, shutting down...");
        }
    }

    shutdown_tx.send(true)?;
    let _ = tokio::time::timeout(Duration::from_secs(5), server_task).await;

    info!("Relay stopped");
    Ok(())
}
