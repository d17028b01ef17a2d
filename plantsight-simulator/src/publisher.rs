//! The publisher tick loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use zenoh::Session;

use plantsight_common::encode_reading;

use crate::generator::ReadingGenerator;
use crate::relay::RelayClient;
use crate::snapshot::SnapshotRenderer;

/// Cooperative single-flow tick loop.
///
/// One tick fully completes (publish, render, stream) before the next
/// begins; ticks never overlap. Every sub-step is best-effort: a
/// transport failure is logged and never terminates the loop.
pub struct TickLoop {
    generator: ReadingGenerator,
    renderer: SnapshotRenderer,
    relay: RelayClient,
    session: Arc<Session>,
    key: String,
    interval: Duration,
}

impl TickLoop {
    pub fn new(
        generator: ReadingGenerator,
        renderer: SnapshotRenderer,
        relay: RelayClient,
        session: Arc<Session>,
        key: impl Into<String>,
        interval: Duration,
    ) -> Self {
        Self {
            generator,
            renderer,
            relay,
            session,
            key: key.into(),
            interval,
        }
    }

    /// Run ticks until the shutdown signal flips.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            key = %self.key,
            interval_ms = self.interval.as_millis() as u64,
            machines = self.generator.machine_ids().len(),
            "Publisher running"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        self.relay.close().await;
        info!("Publisher stopped");
    }

    /// One tick: generate, publish, render, stream, dispose.
    async fn tick(&mut self) {
        let reading = self.generator.next_reading();

        match encode_reading(&reading) {
            Ok(payload) => {
                if let Err(e) = self.session.put(&self.key, payload).await {
                    warn!(key = %self.key, error = %e, "Failed to publish reading");
                } else {
                    debug!(reading = %reading, "Published reading");
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode reading"),
        }

        // The snapshot is dropped at the end of the tick whether or not
        // streaming succeeded.
        let snapshot = self.renderer.render(&reading);
        if let Err(e) = self.relay.send_snapshot(&snapshot).await {
            warn!(error = %e, "Failed to stream snapshot, will reconnect next tick");
        } else {
            debug!(
                machine_id = %snapshot.machine_id,
                bytes = snapshot.as_bytes().len(),
                "Streamed snapshot"
            );
        }
    }
}
