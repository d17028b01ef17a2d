//! Integration tests for the secondary store writer.
//!
//! Drives the writer with wire-format payloads, the same bytes it
//! would receive off the readings key, and inspects the store.

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use plantsight_common::{Reading, encode_reading};
use plantsight_writer_sqlite::{SortOrder, SqlStore, StoreWriter};

fn writer() -> (StoreWriter, TempDir) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = SqlStore::open(dir.path().join("alerts.sqlite")).expect("open store");
    (StoreWriter::new(store), dir)
}

fn payload_at(machine_id: &str, temperature: f64, vibration: f64, minute: u32) -> Vec<u8> {
    let reading = Reading::new(machine_id, temperature, vibration, 1500)
        .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0).unwrap());
    encode_reading(&reading).expect("encode reading")
}

#[test]
fn test_only_hot_or_vibrating_readings_are_persisted() {
    let (mut writer, _dir) = writer();

    writer.handle_payload(&payload_at("M100", 85.0, 1.0, 0)); // hot
    writer.handle_payload(&payload_at("M100", 75.0, 4.5, 1)); // vibrating
    writer.handle_payload(&payload_at("M100", 65.0, 1.0, 2)); // cool and calm
    writer.handle_payload(&payload_at("M100", 80.0, 3.0, 3)); // both at the limit

    let stats = writer.stats();
    assert_eq!(stats.received, 4);
    assert_eq!(stats.persisted, 2);
    assert_eq!(stats.skipped, 2);

    let rows = writer
        .store()
        .query("M100", SortOrder::Ascending, 10)
        .unwrap();
    let temps: Vec<f64> = rows.iter().map(|r| r.reading.temperature).collect();
    assert_eq!(temps, vec![85.0, 75.0]);
}

#[test]
fn test_cool_reading_diverges_from_primary_policy() {
    let (mut writer, _dir) = writer();

    // Below the normal band but calm: the primary writer persists this
    // one, the secondary skips it.
    writer.handle_payload(&payload_at("M104", 65.0, 1.0, 0));

    let stats = writer.stats();
    assert_eq!(stats.persisted, 0);
    assert_eq!(stats.skipped, 1);
    assert!(writer.store().is_empty().unwrap());
}

#[test]
fn test_alerts_keep_full_reading() {
    let (mut writer, _dir) = writer();

    writer.handle_payload(&payload_at("M107", 93.5, 4.12, 30));

    let rows = writer
        .store()
        .query("M107", SortOrder::Descending, 1)
        .unwrap();
    assert_eq!(rows.len(), 1);

    let reading = &rows[0].reading;
    assert_eq!(reading.machine_id, "M107");
    assert_eq!(reading.temperature, 93.5);
    assert_eq!(reading.vibration, 4.12);
    assert_eq!(reading.rpm, 1500);
    assert_eq!(
        reading.timestamp,
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    );
}

#[test]
fn test_malformed_payloads_do_not_stop_the_writer() {
    let (mut writer, _dir) = writer();

    writer.handle_payload(b"not json");
    writer.handle_payload(br#"{"machine_id": "M100"}"#);
    writer.handle_payload(&payload_at("M100", 85.0, 1.0, 0));

    let stats = writer.stats();
    assert_eq!(stats.malformed, 2);
    assert_eq!(stats.persisted, 1);
}

#[test]
fn test_store_survives_reopen() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("alerts.sqlite");

    {
        let store = SqlStore::open(&path).expect("open store");
        let mut writer = StoreWriter::new(store);
        writer.handle_payload(&payload_at("M100", 85.0, 1.0, 0));
    }

    let store = SqlStore::open(&path).expect("reopen store");
    assert_eq!(store.len().unwrap(), 1);
}
