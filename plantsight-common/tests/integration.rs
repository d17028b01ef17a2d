//! Integration tests for plantsight-common.

use chrono::{TimeZone, Utc};
use plantsight_common::{READINGS_KEY, Reading, decode_reading, encode_reading};

#[test]
fn test_full_reading_workflow() {
    let reading = Reading::new("M104", 87.3, 2.41, 1534)
        .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());

    let bytes = encode_reading(&reading).expect("encode failed");
    assert!(!bytes.is_empty());

    let decoded = decode_reading(&bytes).expect("decode failed");
    assert_eq!(decoded, reading);
    assert_eq!(decoded.timestamp, reading.timestamp);
}

#[test]
fn test_wire_timestamp_is_iso8601() {
    let reading = Reading::new("M100", 75.0, 1.5, 1200)
        .with_timestamp(Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());

    let bytes = encode_reading(&reading).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    let ts = value["timestamp"].as_str().unwrap();

    assert!(ts.starts_with("2025-03-01T09:30:00"), "got {}", ts);
    assert!(ts.ends_with('Z'));
}

#[test]
fn test_malformed_payloads_are_rejected_not_panicked() {
    for payload in [
        &b"{}"[..],
        br#"{"machine_id":"M100"}"#,
        br#"{"machine_id":"M100","timestamp":"not a time","temperature":1,"vibration":1,"rpm":1}"#,
        br#"{"machine_id":"M100","timestamp":"2025-03-01T09:00:00Z","temperature":75.0,"vibration":1.5,"rpm":-5}"#,
        b"\x00\x01\x02",
    ] {
        assert!(decode_reading(payload).is_err());
    }
}

#[test]
fn test_readings_topic_is_stable() {
    // Publishers and both writers rendezvous on this key expression;
    // changing it is a wire-format break.
    assert_eq!(READINGS_KEY, "plantsight/readings");
}
