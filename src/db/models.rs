//! Row mapping between SQLite and the task/entry records.

use crate::models::{Entry, Task, TimingState};
use crate::utils::date::{format_date, from_millis, parse_date};
use rusqlite::Row;

/// A record type stored in its own table with an integer primary key `id`.
pub trait Record: Sized {
    const TABLE: &'static str;
    const COLUMNS: &'static str;

    fn from_row(row: &Row) -> rusqlite::Result<Self>;
    fn key(&self) -> i64;
}

pub const TASK_COLUMNS: &str = "id, exid, description, project, client, complete, completed_date, \
     deleted, last_modified, most_recent_entry, total, timing_state, synced";

pub const ENTRY_COLUMNS: &str =
    "id, task, annotation, started_at, ended_at, synced, deleted, last_modified";

impl Record for Task {
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static str = TASK_COLUMNS;

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let completed_date: Option<String> = row.get("completed_date")?;
        let timing_state: String = row.get("timing_state")?;

        Ok(Task {
            id: row.get("id")?,
            exid: row.get("exid")?,
            description: row.get("description")?,
            project: row.get("project")?,
            client: row.get("client")?,
            complete: row.get("complete")?,
            completed_date: completed_date.as_deref().and_then(parse_date),
            deleted: row.get("deleted")?,
            last_modified: from_millis(row.get("last_modified")?),
            most_recent_entry: from_millis(row.get("most_recent_entry")?),
            total: row.get("total")?,
            timing_state: TimingState::from_db_str(&timing_state),
            synced: row.get("synced")?,
        })
    }

    fn key(&self) -> i64 {
        self.id
    }
}

impl Record for Entry {
    const TABLE: &'static str = "entries";
    const COLUMNS: &'static str = ENTRY_COLUMNS;

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let ended_at: Option<i64> = row.get("ended_at")?;

        Ok(Entry {
            id: row.get("id")?,
            task: row.get("task")?,
            annotation: row.get("annotation")?,
            start: from_millis(row.get("started_at")?),
            end: ended_at.map(from_millis),
            synced: row.get("synced")?,
            deleted: row.get("deleted")?,
            last_modified: from_millis(row.get("last_modified")?),
            gap: None,
        })
    }

    fn key(&self) -> i64 {
        self.id
    }
}

pub fn completed_date_str(task: &Task) -> Option<String> {
    task.completed_date.as_ref().map(format_date)
}
