//! JSON wire codec for the readings topic.
//!
//! The readings key expression carries JSON objects with exactly the
//! [`Reading`] fields: `machine_id` (string), `timestamp` (ISO-8601
//! string), `temperature`/`vibration` (numbers), `rpm` (integer).

use crate::error::Result;
use crate::reading::Reading;

/// Prefix marking a snapshot frame on the relay side-channel.
///
/// Frames are text: either `"image:" + base64(bytes)` for a snapshot, or
/// arbitrary text which the relay echoes back to the sender.
pub const IMAGE_FRAME_PREFIX: &str = "image:";

/// Prefix the relay puts on echo replies to non-snapshot frames.
pub const ECHO_REPLY_PREFIX: &str = "Echo: ";

/// Encode a reading for publication.
pub fn encode_reading(reading: &Reading) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(reading)?)
}

/// Decode a reading from an inbound payload.
///
/// Fails on malformed JSON or missing fields; subscribers log and drop
/// such payloads rather than crash.
pub fn decode_reading(data: &[u8]) -> Result<Reading> {
    Ok(serde_json::from_slice(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_roundtrip() {
        let reading = Reading::new("M107", 93.5, 4.12, 1873);

        let encoded = encode_reading(&reading).unwrap();
        let decoded = decode_reading(&encoded).unwrap();

        assert_eq!(reading, decoded);
    }

    #[test]
    fn test_wire_format_fields() {
        let reading = Reading::new("M100", 75.0, 1.5, 1200);
        let encoded = encode_reading(&reading).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(value["machine_id"], "M100");
        assert!(value["timestamp"].is_string());
        assert_eq!(value["temperature"], 75.0);
        assert_eq!(value["vibration"], 1.5);
        assert_eq!(value["rpm"], 1200);
    }

    #[test]
    fn test_decode_rejects_missing_field() {
        // No rpm field
        let payload = br#"{"machine_id":"M100","timestamp":"2025-03-01T09:00:00Z","temperature":75.0,"vibration":1.5}"#;
        assert!(decode_reading(payload).is_err());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_reading(b"not json at all").is_err());
        assert!(decode_reading(b"").is_err());
    }
}
