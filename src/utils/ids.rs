//! Timestamp-based identifiers.
//!
//! Ids are the current epoch milliseconds, bumped past the highest id already
//! handed out so that several records created in the same millisecond stay
//! distinct.

use chrono::{DateTime, Local};

pub fn fresh_id(now: &DateTime<Local>, highest_taken: Option<i64>) -> i64 {
    let candidate = now.timestamp_millis();
    match highest_taken {
        Some(max) if max >= candidate => max + 1,
        _ => candidate,
    }
}
