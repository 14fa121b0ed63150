use super::timestamp;
use crate::utils::time::hours_between;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A recorded time interval against a task.
///
/// `task` is a weak reference to a task's `exid`: the task may not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub task: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(with = "timestamp")]
    pub start: DateTime<Local>,
    #[serde(default, with = "timestamp::option")]
    pub end: Option<DateTime<Local>>,
    #[serde(default)]
    pub synced: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default = "Local::now", with = "timestamp")]
    pub last_modified: DateTime<Local>,
    /// Hours since the previous entry ended. Derived, never stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
}

impl Entry {
    pub fn new(id: i64, task: &str, start: DateTime<Local>, end: Option<DateTime<Local>>) -> Self {
        Self {
            id,
            task: task.to_string(),
            annotation: String::new(),
            start,
            end,
            synced: false,
            deleted: false,
            last_modified: Local::now(),
            gap: None,
        }
    }

    /// Duration in hours, `None` while the entry is still open.
    pub fn duration_hours(&self) -> Option<f64> {
        self.end.map(|end| hours_between(&self.start, &end))
    }

    /// Field-by-field comparison ignoring `last_modified` and the derived `gap`.
    pub fn same_content(&self, other: &Entry) -> bool {
        self.id == other.id
            && self.task == other.task
            && self.annotation == other.annotation
            && self.start.timestamp_millis() == other.start.timestamp_millis()
            && self.end.map(|e| e.timestamp_millis()) == other.end.map(|e| e.timestamp_millis())
            && self.synced == other.synced
            && self.deleted == other.deleted
    }
}

/// The in-progress, not yet saved entry of the task being timed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
    pub task: String,
    #[serde(with = "timestamp")]
    pub start: DateTime<Local>,
    #[serde(default)]
    pub annotation: String,
}

impl NewEntry {
    pub fn open(task: &str, start: DateTime<Local>) -> Self {
        Self {
            task: task.to_string(),
            start,
            annotation: String::new(),
        }
    }

    /// Close the interval at `end`, producing a completed entry.
    pub fn finalize(self, id: i64, end: DateTime<Local>) -> Entry {
        let mut entry = Entry::new(id, &self.task, self.start, Some(end));
        entry.annotation = self.annotation;
        entry.last_modified = end;
        entry
    }
}
