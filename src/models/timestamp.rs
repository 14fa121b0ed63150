//! Serde helpers for timestamps.
//!
//! Timestamps are written as epoch milliseconds. On read both epoch
//! milliseconds and RFC 3339 strings are accepted, since older persisted
//! blobs stored `Date` values as ISO strings.

use crate::utils::date::from_millis;
use chrono::{DateTime, Local};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

pub fn serialize<S: Serializer>(ts: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(ts.timestamp_millis())
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
    let raw = Value::deserialize(d)?;
    parse_value(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Interpret a JSON value as a timestamp (number of ms, numeric string or RFC 3339).
pub fn parse_value(raw: &Value) -> Option<DateTime<Local>> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(from_millis),
        Value::String(s) => s.parse::<i64>().ok().map(from_millis).or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Local))
        }),
        _ => None,
    }
}

pub mod option {
    use super::parse_value;
    use chrono::{DateTime, Local};
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Local>>, s: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_i64(ts.timestamp_millis()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Local>>, D::Error> {
        let raw = Option::<Value>::deserialize(d)?;
        Ok(raw.as_ref().and_then(parse_value))
    }
}
