//! Zenoh subscriber feeding the SQL store.

use tokio::sync::watch;
use tracing::{debug, error, info, trace, warn};
use zenoh::sample::SampleKind;

use plantsight_common::{READINGS_KEY, ZenohConfig, decode_reading};

use crate::policy;
use crate::store::SqlStore;

/// Errors that stop the writer.
#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error(transparent)]
    Common(#[from] plantsight_common::Error),

    #[error("Subscriber error: {0}")]
    Subscribe(String),
}

/// Connection lifecycle, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Disconnected,
    Connecting,
    Subscribed,
}

impl std::fmt::Display for WriterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriterState::Disconnected => write!(f, "disconnected"),
            WriterState::Connecting => write!(f, "connecting"),
            WriterState::Subscribed => write!(f, "subscribed"),
        }
    }
}

/// Running counters, reported once at shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    /// Messages received from the readings key.
    pub received: u64,
    /// Readings persisted as alerts.
    pub persisted: u64,
    /// Readings that did not qualify under the alert policy.
    pub skipped: u64,
    /// Payloads that failed to decode.
    pub malformed: u64,
    /// Persist attempts that failed at the store.
    pub store_errors: u64,
}

/// Store writer: subscribes to readings and persists qualifying ones.
pub struct StoreWriter {
    store: SqlStore,
    key_expr: String,
    state: WriterState,
    stats: WriterStats,
}

impl StoreWriter {
    pub fn new(store: SqlStore) -> Self {
        Self {
            store,
            key_expr: READINGS_KEY.to_string(),
            state: WriterState::Disconnected,
            stats: WriterStats::default(),
        }
    }

    /// Set a custom key expression to subscribe to.
    pub fn with_key_expr(mut self, key_expr: impl Into<String>) -> Self {
        self.key_expr = key_expr.into();
        self
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    pub fn store(&self) -> &SqlStore {
        &self.store
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    fn set_state(&mut self, state: WriterState) {
        if self.state != state {
            info!(from = %self.state, to = %state, "Writer state changed");
            self.state = state;
        }
    }

    /// Process one payload from the readings key.
    ///
    /// Malformed payloads and store failures are counted and logged;
    /// neither stops the writer.
    pub fn handle_payload(&mut self, payload: &[u8]) {
        self.stats.received += 1;

        let reading = match decode_reading(payload) {
            Ok(reading) => reading,
            Err(e) => {
                self.stats.malformed += 1;
                warn!(payload_len = payload.len(), "Dropping malformed reading: {}", e);
                return;
            }
        };

        if !policy::qualifies(&reading) {
            self.stats.skipped += 1;
            trace!(%reading, "Reading within limits, skipping");
            return;
        }

        match self.store.insert(&reading) {
            Ok(id) => {
                self.stats.persisted += 1;
                debug!(%reading, id, "Persisted alert");
            }
            Err(e) => {
                self.stats.store_errors += 1;
                error!(%reading, "Failed to persist alert: {}", e);
            }
        }
    }

    /// Run the writer until the shutdown signal is received.
    pub async fn run(
        mut self,
        zenoh: &ZenohConfig,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<WriterStats, WriterError> {
        self.set_state(WriterState::Connecting);
        let session = plantsight_common::connect(zenoh).await?;

        info!(key_expr = %self.key_expr, "Subscribing to readings");
        let subscriber = session
            .declare_subscriber(&self.key_expr)
            .await
            .map_err(|e| WriterError::Subscribe(e.to_string()))?;
        self.set_state(WriterState::Subscribed);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received, stopping writer");
                        break;
                    }
                }

                sample = subscriber.recv_async() => {
                    match sample {
                        Ok(sample) => {
                            if sample.kind() == SampleKind::Delete {
                                trace!(key = %sample.key_expr(), "Ignoring delete sample");
                                continue;
                            }
                            let payload = sample.payload().to_bytes();
                            self.handle_payload(&payload);
                        }
                        Err(e) => {
                            warn!("Error receiving sample: {}", e);
                        }
                    }
                }
            }
        }

        subscriber
            .undeclare()
            .await
            .map_err(|e| WriterError::Subscribe(e.to_string()))?;
        session
            .close()
            .await
            .map_err(plantsight_common::Error::Zenoh)?;
        self.set_state(WriterState::Disconnected);

        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plantsight_common::{Reading, encode_reading};

    fn writer() -> (StoreWriter, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SqlStore::open(dir.path().join("alerts.sqlite")).expect("open store");
        (StoreWriter::new(store), dir)
    }

    fn payload(temperature: f64, vibration: f64) -> Vec<u8> {
        encode_reading(&Reading::new("M105", temperature, vibration, 1400)).unwrap()
    }

    #[test]
    fn test_hot_reading_is_persisted() {
        let (mut writer, _dir) = writer();

        writer.handle_payload(&payload(85.0, 1.0));

        let stats = writer.stats();
        assert_eq!(stats.received, 1);
        assert_eq!(stats.persisted, 1);
        assert_eq!(stats.skipped, 0);
    }

    #[test]
    fn test_vibrating_reading_is_persisted() {
        let (mut writer, _dir) = writer();

        writer.handle_payload(&payload(75.0, 4.5));

        assert_eq!(writer.stats().persisted, 1);
    }

    #[test]
    fn test_cool_calm_reading_is_skipped() {
        let (mut writer, _dir) = writer();

        // Below the normal band: the primary writer's rule, not ours.
        writer.handle_payload(&payload(65.0, 1.0));

        let stats = writer.stats();
        assert_eq!(stats.persisted, 0);
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_malformed_payload_is_counted_and_dropped() {
        let (mut writer, _dir) = writer();

        writer.handle_payload(b"not json");
        writer.handle_payload(&payload(85.0, 1.0));

        let stats = writer.stats();
        assert_eq!(stats.received, 2);
        assert_eq!(stats.malformed, 1);
        assert_eq!(stats.persisted, 1);
    }
}
