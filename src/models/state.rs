//! In-memory application state and the partial states adapters return.

use super::{Entry, NewEntry, Settings, Task};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Current version of the persisted state shape.
pub const STATE_VERSION: u32 = 3;

/// Everything ever recorded, as opposed to the "today" working set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archive {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Totals for the working set, recomputed after every action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    #[serde(default)]
    pub total_hours: f64,
    #[serde(default)]
    pub synced_hours: f64,
    #[serde(default)]
    pub unsynced_hours: f64,
    #[serde(default)]
    pub earnings: f64,
    #[serde(default)]
    pub tax_amount: f64,
    #[serde(default)]
    pub net: f64,
}

/// The working copy the reducer operates on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub new_entry: Option<NewEntry>,
    #[serde(default)]
    pub current_task: Option<String>,
    #[serde(default)]
    pub entries: Vec<Entry>,
    #[serde(default)]
    pub clients: Vec<String>,
    #[serde(default)]
    pub archive: Archive,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub deleted_tasks: Vec<Task>,
    #[serde(default)]
    pub stats: DailyStats,
    #[serde(default)]
    pub version: u32,
}

impl AppState {
    pub fn task(&self, exid: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.exid == exid)
    }

    pub fn task_mut(&mut self, exid: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.exid == exid)
    }

    pub fn running_task(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.is_running())
    }

    /// Highest entry id in use (working set, archive and deleted entries).
    pub fn highest_entry_id(&self) -> Option<i64> {
        self.entries
            .iter()
            .chain(self.archive.entries.iter())
            .map(|e| e.id)
            .max()
    }

    /// Highest task id in use, including soft-deleted tasks.
    pub fn highest_task_id(&self) -> Option<i64> {
        self.tasks
            .iter()
            .chain(self.deleted_tasks.iter())
            .chain(self.archive.tasks.iter())
            .map(|t| t.id)
            .max()
    }
}

/// A subset of the application state, as produced by one adapter.
///
/// `None` means "this adapter does not own the field". Merging is shallow:
/// a `Some` field in a later partial overwrites the earlier one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialState {
    pub settings: Option<Settings>,
    pub new_entry: Option<Option<NewEntry>>,
    pub current_task: Option<Option<String>>,
    pub entries: Option<Vec<Entry>>,
    pub clients: Option<Vec<String>>,
    pub archive: Option<Archive>,
    pub tasks: Option<Vec<Task>>,
    pub deleted_tasks: Option<Vec<Task>>,
    pub stats: Option<DailyStats>,
    pub version: Option<u32>,
}

macro_rules! overwrite {
    ($dst:ident, $src:ident, $($field:ident),+) => {
        $(
            if $src.$field.is_some() {
                $dst.$field = $src.$field;
            }
        )+
    };
}

impl PartialState {
    /// Shallow-merge `later` over `self`.
    pub fn merge(&mut self, later: PartialState) {
        overwrite!(
            self,
            later,
            settings,
            new_entry,
            current_task,
            entries,
            clients,
            archive,
            tasks,
            deleted_tasks,
            stats,
            version
        );
    }

    /// Assemble a full state, filling absent fields with defaults.
    ///
    /// Tasks carrying a session deletion marker are kept out of `tasks`.
    pub fn into_state(self) -> AppState {
        let deleted_tasks = self.deleted_tasks.unwrap_or_default();
        let deleted: HashSet<&str> = deleted_tasks.iter().map(|t| t.exid.as_str()).collect();

        let tasks = self
            .tasks
            .unwrap_or_default()
            .into_iter()
            .filter(|t| !t.deleted && !deleted.contains(t.exid.as_str()))
            .collect();

        AppState {
            settings: self.settings.unwrap_or_default(),
            new_entry: self.new_entry.flatten(),
            current_task: self.current_task.flatten(),
            entries: self.entries.unwrap_or_default(),
            clients: self.clients.unwrap_or_default(),
            archive: self.archive.unwrap_or_default(),
            tasks,
            deleted_tasks,
            stats: self.stats.unwrap_or_default(),
            version: self.version.unwrap_or(STATE_VERSION),
        }
    }
}
