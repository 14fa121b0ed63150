//! Duration utilities: hours between instants, rounding and formatting.

use chrono::{DateTime, Local};

/// Round a value in hours to two decimals.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}

/// Fractional hours from `start` to `end` (negative when `end` precedes `start`).
pub fn hours_between(start: &DateTime<Local>, end: &DateTime<Local>) -> f64 {
    (*end - *start).num_milliseconds() as f64 / 3_600_000.0
}

/// Format hours as `HHh MMm`, e.g. `1.5` → `01h 30m`.
pub fn format_hours(hours: f64) -> String {
    let mins = (hours * 60.0).round() as i64;
    let sign = if mins < 0 { "-" } else { "" };
    let m = mins.abs();
    format!("{}{:02}h {:02}m", sign, m / 60, m % 60)
}

pub fn format_clock(ts: &DateTime<Local>) -> String {
    ts.format("%H:%M").to_string()
}
