//! History (de)serialization.
//!
//! The persisted form is a single JSON array of entries. Loading goes through
//! [`decode`], which never fails: it returns [`Loaded::Rejected`] for anything
//! that is not an array so the caller can heal the store.

use std::fmt;

use serde_json::Value;
use tracing::warn;

use crate::Result;
use crate::history::MAX_ENTRIES;
use crate::history::model::HistoryEntry;

/// Timestamps as ISO-8601 strings with millisecond precision.
pub mod iso_timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Only strings are accepted; numbers or objects fail the entry.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Not valid JSON at all.
    Malformed(String),
    /// Valid JSON whose top level is not an array.
    NotAList(&'static str),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Malformed(e) => write!(f, "malformed JSON: {e}"),
            RejectReason::NotAList(kind) => write!(f, "expected a list, found {kind}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Valid(Vec<HistoryEntry>),
    Rejected(RejectReason),
}

pub fn encode(entries: &[HistoryEntry]) -> Result<String> {
    Ok(serde_json::to_string(entries)?)
}

pub fn decode(raw: &str) -> Loaded {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => return Loaded::Rejected(RejectReason::Malformed(e.to_string())),
    };

    let items = match value {
        Value::Array(items) => items,
        other => return Loaded::Rejected(RejectReason::NotAList(kind_of(&other))),
    };

    let mut entries = Vec::with_capacity(items.len().min(MAX_ENTRIES));
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<HistoryEntry>(item) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Skipping unreadable history entry #{}: {}", index, e),
        }
    }
    entries.truncate(MAX_ENTRIES);

    Loaded::Valid(entries)
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{RequestDescriptor, ResponseModel};
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn sample_entry() -> HistoryEntry {
        let request = RequestDescriptor::new("POST", "https://example.com/items")
            .with_header("Content-Type", "application/json")
            .with_query("page", "2")
            .with_body(r#"{"name":"foo"}"#);
        HistoryEntry::new(
            request,
            Some(ResponseModel::local_failure("boom", Duration::from_millis(12))),
        )
    }

    #[test]
    fn test_round_trip_preserves_entries() {
        let entries = vec![sample_entry(), sample_entry()];
        let raw = encode(&entries).unwrap();

        match decode(&raw) {
            Loaded::Valid(decoded) => assert_eq!(decoded, entries),
            Loaded::Rejected(reason) => panic!("unexpected rejection: {reason}"),
        }
    }

    #[test]
    fn test_timestamp_is_iso_string() {
        let mut entry = sample_entry();
        entry.timestamp = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["timestamp"], "2024-05-01T08:30:00.000Z");
    }

    #[test]
    fn test_decode_accepts_offset_timestamps() {
        let raw = r#"[{"id":"1","request":{"method":"GET","url":"/"},"timestamp":"2024-05-01T10:30:00.123+02:00"}]"#;
        let Loaded::Valid(entries) = decode(raw) else {
            panic!("expected valid history");
        };
        assert_eq!(entries[0].timestamp.to_rfc3339(), "2024-05-01T08:30:00.123+00:00");
        assert!(entries[0].response.is_none());
    }

    #[test]
    fn test_decode_rejects_non_lists() {
        assert_eq!(decode("{}"), Loaded::Rejected(RejectReason::NotAList("object")));
        assert_eq!(decode("42"), Loaded::Rejected(RejectReason::NotAList("number")));
        assert!(matches!(
            decode("not json"),
            Loaded::Rejected(RejectReason::Malformed(_))
        ));
    }

    #[test]
    fn test_decode_skips_bad_entries() {
        let good = serde_json::to_value(sample_entry()).unwrap();
        let mut bad = good.clone();
        bad["timestamp"] = serde_json::json!(1714552200000u64);

        let raw = serde_json::to_string(&vec![bad, good.clone()]).unwrap();
        let Loaded::Valid(entries) = decode(&raw) else {
            panic!("expected valid history");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(serde_json::to_value(&entries[0]).unwrap(), good);
    }

    #[test]
    fn test_decode_truncates_to_capacity() {
        let entries: Vec<HistoryEntry> = (0..MAX_ENTRIES + 5).map(|_| sample_entry()).collect();
        let raw = encode(&entries).unwrap();
        let Loaded::Valid(decoded) = decode(&raw) else {
            panic!("expected valid history");
        };
        assert_eq!(decoded.len(), MAX_ENTRIES);
        assert_eq!(decoded[0].id, entries[0].id);
    }
}
