//! Embedded SQL store for alert rows.
//!
//! Alerts land in one `machine_alerts` table, one column per reading
//! field. Timestamps are stored as fixed-width UTC text so `ORDER BY
//! timestamp` is time order.

use std::path::Path;

use chrono::{DateTime, Utc};
use sqlite::{ConnectionThreadSafe, State};
use thiserror::Error;

use plantsight_common::Reading;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS machine_alerts (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        machine_id  TEXT NOT NULL,
        timestamp   TEXT NOT NULL,
        temperature REAL NOT NULL,
        vibration   REAL NOT NULL,
        rpm         INTEGER NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_machine_alerts_machine_time
        ON machine_alerts (machine_id, timestamp);
";

/// Errors from the SQL store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] sqlite::Error),

    #[error("Invalid stored timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

/// A persisted alert with its store-assigned row id.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    /// Store-assigned row id.
    pub id: i64,
    /// The persisted reading.
    pub reading: Reading,
}

/// Query sort order over a machine's alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Most recent first.
    Descending,
}

/// SQL store holding alert rows.
///
/// Owned exclusively by its writer; no other component touches the
/// database file.
pub struct SqlStore {
    connection: ConnectionThreadSafe,
}

impl SqlStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let connection = sqlite::Connection::open_thread_safe(path)?;
        connection.execute(SCHEMA)?;
        Ok(Self { connection })
    }

    /// Persist one reading as an alert row, returning its row id.
    pub fn insert(&self, reading: &Reading) -> Result<i64, StoreError> {
        let mut statement = self.connection.prepare(
            "INSERT INTO machine_alerts (machine_id, timestamp, temperature, vibration, rpm)
             VALUES (?, ?, ?, ?, ?)",
        )?;
        statement.bind((1, reading.machine_id.as_str()))?;
        statement.bind((2, reading.timestamp_key().as_str()))?;
        statement.bind((3, reading.temperature))?;
        statement.bind((4, reading.vibration))?;
        statement.bind((5, reading.rpm as i64))?;
        while statement.next()? != State::Done {}

        let mut rowid = self.connection.prepare("SELECT last_insert_rowid()")?;
        rowid.next()?;
        Ok(rowid.read::<i64, _>(0)?)
    }

    /// Total number of alert rows.
    pub fn len(&self) -> Result<u64, StoreError> {
        let mut statement = self
            .connection
            .prepare("SELECT COUNT(*) FROM machine_alerts")?;
        statement.next()?;
        Ok(statement.read::<i64, _>(0)? as u64)
    }

    /// True if no alerts have been persisted.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Query one machine's alerts in timestamp order, up to `limit`.
    pub fn query(
        &self,
        machine_id: &str,
        order: SortOrder,
        limit: usize,
    ) -> Result<Vec<AlertRow>, StoreError> {
        let sql = match order {
            SortOrder::Ascending => {
                "SELECT id, machine_id, timestamp, temperature, vibration, rpm
                 FROM machine_alerts WHERE machine_id = ?
                 ORDER BY timestamp ASC, id ASC LIMIT ?"
            }
            SortOrder::Descending => {
                "SELECT id, machine_id, timestamp, temperature, vibration, rpm
                 FROM machine_alerts WHERE machine_id = ?
                 ORDER BY timestamp DESC, id DESC LIMIT ?"
            }
        };

        let mut statement = self.connection.prepare(sql)?;
        statement.bind((1, machine_id))?;
        statement.bind((2, limit as i64))?;

        let mut rows = Vec::new();
        while statement.next()? == State::Row {
            let timestamp: DateTime<Utc> = statement
                .read::<String, _>(2)?
                .parse::<DateTime<Utc>>()?;
            rows.push(AlertRow {
                id: statement.read::<i64, _>(0)?,
                reading: Reading::new(
                    statement.read::<String, _>(1)?,
                    statement.read::<f64, _>(3)?,
                    statement.read::<f64, _>(4)?,
                    statement.read::<i64, _>(5)? as u32,
                )
                .with_timestamp(timestamp),
            });
        }

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn open_store() -> (SqlStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = SqlStore::open(dir.path().join("alerts.sqlite")).expect("open store");
        (store, dir)
    }

    fn reading_at(machine_id: &str, hour: u32) -> Reading {
        Reading::new(machine_id, 85.0, 3.5, 1500)
            .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_insert_assigns_distinct_ids() {
        let (store, _dir) = open_store();
        let reading = reading_at("M100", 9);

        let a = store.insert(&reading).unwrap();
        let b = store.insert(&reading).unwrap();

        assert_ne!(a, b, "identical readings still get distinct identities");
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_roundtrip_preserves_reading() {
        let (store, _dir) = open_store();
        let reading = Reading::new("M107", 93.5, 4.12, 1873)
            .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());

        store.insert(&reading).unwrap();

        let rows = store.query("M107", SortOrder::Ascending, 1).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reading, reading);
    }

    #[test]
    fn test_query_filters_by_machine() {
        let (store, _dir) = open_store();
        store.insert(&reading_at("M100", 9)).unwrap();
        store.insert(&reading_at("M101", 10)).unwrap();
        store.insert(&reading_at("M100", 11)).unwrap();

        let rows = store.query("M100", SortOrder::Ascending, 10).unwrap();

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.reading.machine_id == "M100"));
    }

    #[test]
    fn test_query_orders_by_timestamp() {
        let (store, _dir) = open_store();
        // Insert out of time order.
        store.insert(&reading_at("M100", 11)).unwrap();
        store.insert(&reading_at("M100", 9)).unwrap();
        store.insert(&reading_at("M100", 10)).unwrap();

        let hours = |rows: &[AlertRow]| -> Vec<u32> {
            use chrono::Timelike;
            rows.iter().map(|r| r.reading.timestamp.hour()).collect()
        };

        let ascending = store.query("M100", SortOrder::Ascending, 10).unwrap();
        assert_eq!(hours(&ascending), vec![9, 10, 11]);

        let descending = store.query("M100", SortOrder::Descending, 2).unwrap();
        assert_eq!(hours(&descending), vec![11, 10]);
    }

    #[test]
    fn test_empty_store_queries_cleanly() {
        let (store, _dir) = open_store();
        assert!(store.is_empty().unwrap());
        assert!(
            store
                .query("M100", SortOrder::Descending, 5)
                .unwrap()
                .is_empty()
        );
    }
}
