//! Database statistics for `db --info`.

use crate::db::migrate::user_version;
use crate::db::pool::TimesheetDb;
use crate::errors::AppResult;
use crate::utils::date::from_millis;
use chrono::{DateTime, Local};

#[derive(Debug, Clone, Default)]
pub struct DbInfo {
    pub schema_version: u32,
    pub file_size: u64,
    pub tasks: i64,
    pub deleted_tasks: i64,
    pub entries: i64,
    pub links: i64,
    pub first_entry: Option<DateTime<Local>>,
    pub last_entry: Option<DateTime<Local>>,
}

impl DbInfo {
    /// Average number of entries per day over the recorded range.
    pub fn entries_per_day(&self) -> Option<f64> {
        let (first, last) = (self.first_entry?, self.last_entry?);
        let days = (last.date_naive() - first.date_naive()).num_days().max(1);
        Some(self.entries as f64 / days as f64)
    }
}

fn count(db: &TimesheetDb, sql: &str) -> AppResult<i64> {
    Ok(db.conn.query_row(sql, [], |row| row.get(0))?)
}

impl TimesheetDb {
    pub fn db_info(&self) -> AppResult<DbInfo> {
        let file_size = self
            .path()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0);

        let (first, last): (Option<i64>, Option<i64>) = self.conn.query_row(
            "SELECT MIN(started_at), MAX(started_at) FROM entries WHERE deleted = 0",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(DbInfo {
            schema_version: user_version(&self.conn)?,
            file_size,
            tasks: count(self, "SELECT COUNT(*) FROM tasks WHERE deleted = 0")?,
            deleted_tasks: count(self, "SELECT COUNT(*) FROM tasks WHERE deleted = 1")?,
            entries: count(self, "SELECT COUNT(*) FROM entries WHERE deleted = 0")?,
            links: count(self, "SELECT COUNT(*) FROM file_handles")?,
            first_entry: first.map(from_millis),
            last_entry: last.map(from_millis),
        })
    }
}
