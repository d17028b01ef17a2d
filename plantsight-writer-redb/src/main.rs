//! Primary store writer.
//!
//! Subscribes to machine readings and persists out-of-range
//! temperatures to an embedded document store.

use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use plantsight_common::init_tracing;
use plantsight_writer_redb::{DocStore, StoreWriter, WriterConfig};

/// Primary store writer.
#[derive(Parser, Debug)]
#[command(name = "plantsight-writer-redb")]
#[command(about = "Persist out-of-range readings to an embedded document store")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// Override the database file path.
    #[arg(long)]
    store_path: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        WriterConfig::load_from_file(config_path)?
    } else {
        WriterConfig::default()
    };

    if let Some(path) = args.store_path {
        config.store.path = path;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    config.validate()?;

    init_tracing(&config.logging)?;

    info!(path = %config.store.path, "Starting PlantSight primary store writer");

    let store = DocStore::open(&config.store.path)?;
    let writer = StoreWriter::new(store).with_key_expr(config.store.key.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let zenoh = config.zenoh.clone();
    let writer_task = tokio::spawn(async move { writer.run(&zenoh, shutdown_rx).await });

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
    match tokio::time::timeout(Duration::from_secs(5), writer_task).await {
        Ok(Ok(Ok(stats))) => {
            info!(
                received = stats.received,
                persisted = stats.persisted,
                skipped = stats.skipped,
                malformed = stats.malformed,
                store_errors = stats.store_errors,
                "Writer stopped"
            );
        }
        Ok(Ok(Err(e))) => {
            tracing::error!("Writer exited with error: {}", e);
        }
        Ok(Err(e)) => {
            tracing::error!("Writer task panicked: {}", e);
        }
        Err(_) => {
            tracing::warn!("Writer did not stop within 5s");
        }
    }

    Ok(())
}
