//! Embedded document store for alert records.
//!
//! Alerts live in one redb table with `&str` keys and JSON-serialized
//! readings as values. Keys are `{machine_id}/{timestamp}/{seq}`: the
//! timestamp is fixed-width UTC so lexicographic key order is time
//! order within a machine, and the sequence number disambiguates
//! readings landing in the same microsecond.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};
use thiserror::Error;

use plantsight_common::Reading;

/// Alert records keyed by `{machine_id}/{timestamp}/{seq}`.
const ALERTS: TableDefinition<&str, &[u8]> = TableDefinition::new("alerts");

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Record serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A persisted alert with its store-assigned identity.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    /// Store-assigned key.
    pub id: String,
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

/// Document store holding alert records.
///
/// Owned exclusively by its writer; no other component touches the
/// database file.
pub struct DocStore {
    db: Database,
    seq: AtomicU64,
}

impl DocStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let db = Database::create(path)?;

        // Create the table up front so reads on a fresh store succeed.
        let txn = db.begin_write()?;
        txn.open_table(ALERTS)?;
        txn.commit()?;

        Ok(Self {
            db,
            seq: AtomicU64::new(0),
        })
    }

    /// Persist one reading as an alert record, assigning its key.
    pub fn insert(&self, reading: &Reading) -> Result<String, StoreError> {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let key = format!(
            "{}/{}/{:08}",
            reading.machine_id,
            reading.timestamp_key(),
            seq
        );
        let value = serde_json::to_vec(reading)?;

        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(ALERTS)?;
            table.insert(key.as_str(), value.as_slice())?;
        }
        txn.commit()?;

        Ok(key)
    }

    /// Total number of alert records.
    pub fn len(&self) -> Result<u64, StoreError> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(ALERTS)?;
        Ok(table.len()?)
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
    ) -> Result<Vec<AlertRecord>, StoreError> {
        // All keys for a machine share the `{machine_id}/` prefix; '0'
        // is the first byte after '/' so this range covers exactly them.
        let low = format!("{}/", machine_id);
        let high = format!("{}0", machine_id);

        let txn = self.db.begin_read()?;
        let table = txn.open_table(ALERTS)?;
        let range = table.range::<&str>(low.as_str()..high.as_str())?;

        let mut records = Vec::new();
        match order {
            SortOrder::Ascending => {
                for entry in range.take(limit) {
                    records.push(to_record(entry?)?);
                }
            }
            SortOrder::Descending => {
                for entry in range.rev().take(limit) {
                    records.push(to_record(entry?)?);
                }
            }
        }

        Ok(records)
    }
}

type Entry<'a> = (
    redb::AccessGuard<'a, &'static str>,
    redb::AccessGuard<'a, &'static [u8]>,
);

fn to_record(entry: Entry<'_>) -> Result<AlertRecord, StoreError> {
    let (key, value) = entry;
    Ok(AlertRecord {
        id: key.value().to_string(),
        reading: serde_json::from_slice(value.value())?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn open_store() -> (DocStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let store = DocStore::open(dir.path().join("alerts.redb")).expect("open store");
        (store, dir)
    }

    fn reading_at(machine_id: &str, hour: u32) -> Reading {
        Reading::new(machine_id, 95.0, 1.0, 1500)
            .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap())
    }

    #[test]
    fn test_insert_assigns_distinct_keys() {
        let (store, _dir) = open_store();
        let reading = reading_at("M100", 9);

        let a = store.insert(&reading).unwrap();
        let b = store.insert(&reading).unwrap();

        assert_ne!(a, b, "identical readings still get distinct identities");
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_query_filters_by_machine() {
        let (store, _dir) = open_store();
        store.insert(&reading_at("M100", 9)).unwrap();
        store.insert(&reading_at("M101", 10)).unwrap();
        store.insert(&reading_at("M100", 11)).unwrap();

        let records = store.query("M100", SortOrder::Ascending, 10).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.reading.machine_id == "M100"));
    }

    #[test]
    fn test_query_orders_by_timestamp() {
        let (store, _dir) = open_store();
        // Insert out of time order.
        store.insert(&reading_at("M100", 11)).unwrap();
        store.insert(&reading_at("M100", 9)).unwrap();
        store.insert(&reading_at("M100", 10)).unwrap();

        let ascending = store.query("M100", SortOrder::Ascending, 10).unwrap();
        let hours: Vec<u32> = ascending
            .iter()
            .map(|r| {
                use chrono::Timelike;
                r.reading.timestamp.hour()
            })
            .collect();
        assert_eq!(hours, vec![9, 10, 11]);

        let descending = store.query("M100", SortOrder::Descending, 10).unwrap();
        let hours: Vec<u32> = descending
            .iter()
            .map(|r| {
                use chrono::Timelike;
                r.reading.timestamp.hour()
            })
            .collect();
        assert_eq!(hours, vec![11, 10, 9]);
    }

    #[test]
    fn test_recent_k_descending_then_reversed_is_ascending() {
        let (store, _dir) = open_store();
        for hour in 0..8 {
            store.insert(&reading_at("M100", hour)).unwrap();
        }

        let mut recent = store.query("M100", SortOrder::Descending, 3).unwrap();
        recent.reverse();

        let hours: Vec<u32> = recent
            .iter()
            .map(|r| {
                use chrono::Timelike;
                r.reading.timestamp.hour()
            })
            .collect();
        assert_eq!(hours, vec![5, 6, 7], "the 3 most recent, oldest first");
    }

    #[test]
    fn test_machine_id_prefix_does_not_leak() {
        let (store, _dir) = open_store();
        store.insert(&reading_at("M10", 9)).unwrap();
        store.insert(&reading_at("M100", 9)).unwrap();

        let records = store.query("M10", SortOrder::Ascending, 10).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reading.machine_id, "M10");
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
