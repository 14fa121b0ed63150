//! Calendar helpers: "today" boundaries and epoch-millisecond conversions.

use chrono::{DateTime, Local, NaiveDate, TimeZone};

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Local midnight at the start of `date`.
///
/// On days where midnight does not exist (DST gaps) the earliest valid
/// instant of that day is used.
pub fn start_of_day(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&midnight) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(earliest, _) => earliest,
        chrono::LocalResult::None => Local.from_utc_datetime(&midnight),
    }
}

pub fn start_of_today() -> DateTime<Local> {
    start_of_day(today())
}

pub fn to_millis(ts: &DateTime<Local>) -> i64 {
    ts.timestamp_millis()
}

pub fn from_millis(ms: i64) -> DateTime<Local> {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .unwrap_or_default()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
