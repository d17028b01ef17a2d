//! Simulated machine telemetry publisher.
//!
//! Generates one synthetic reading per tick, publishes it on the
//! readings key expression, and streams a rendered snapshot card to the
//! relay.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::watch;
use tracing::info;

use plantsight_common::{connect, init_tracing};
use plantsight_simulator::{ReadingGenerator, RelayClient, SimulatorConfig, SnapshotRenderer, TickLoop};

/// Simulated machine telemetry publisher.
#[derive(Parser, Debug)]
#[command(name = "plantsight-simulator")]
#[command(about = "Publish simulated machine readings and snapshots")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format).
    #[arg(short, long)]
    config: Option<String>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = if let Some(config_path) = &args.config {
        SimulatorConfig::load_from_file(config_path)?
    } else {
        SimulatorConfig::default()
    };

    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging)?;

    info!("Starting PlantSight simulator");

    let session = Arc::new(connect(&config.zenoh).await?);

    let generator = ReadingGenerator::new(config.simulation.machine_count);
    let renderer = SnapshotRenderer::new(
        config.simulation.snapshot.width,
        config.simulation.snapshot.height,
    );
    let relay = RelayClient::new(config.simulation.relay_url.clone());

    let tick_loop = TickLoop::new(
        generator,
        renderer,
        relay,
        session.clone(),
        config.simulation.key.clone(),
        Duration::from_millis(config.simulation.tick_interval_ms),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_task = tokio::spawn(tick_loop.run(shutdown_rx));

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
    let _ = tokio::time::timeout(Duration::from_secs(5), loop_task).await;

    if let Err(e) = session.close().await {
        tracing::warn!(error = %e, "Error closing Zenoh session");
    }

    info!("Simulator stopped");
    Ok(())
}
