use super::timestamp;
use super::timing_state::TimingState;
use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A trackable unit of work, identified by its external id (`exid`).
///
/// `id` is the internal numeric id. `total`, `most_recent_entry` and `synced`
/// are derived from the task's entries by the reducer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub exid: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default)]
    pub complete: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<NaiveDate>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default = "Local::now", with = "timestamp")]
    pub last_modified: DateTime<Local>,
    #[serde(default = "Local::now", with = "timestamp")]
    pub most_recent_entry: DateTime<Local>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub timing_state: TimingState,
    #[serde(default)]
    pub synced: bool,
}

impl Default for Task {
    fn default() -> Self {
        Self::new("", "", Local::now())
    }
}

impl Task {
    pub fn new(exid: &str, description: &str, now: DateTime<Local>) -> Self {
        Self {
            exid: exid.to_string(),
            id: 0,
            description: description.to_string(),
            project: None,
            client: None,
            complete: false,
            completed_date: None,
            deleted: false,
            last_modified: now,
            most_recent_entry: now,
            total: 0.0,
            timing_state: TimingState::Stop,
            synced: false,
        }
    }

    pub fn with_project(mut self, project: &str) -> Self {
        self.project = Some(project.to_string());
        self
    }

    pub fn with_client(mut self, client: &str) -> Self {
        self.client = Some(client.to_string());
        self
    }

    pub fn has_exid(&self) -> bool {
        !self.exid.trim().is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.timing_state.is_running()
    }

    /// Project, treating an empty string as absent.
    pub fn project_name(&self) -> Option<&str> {
        self.project.as_deref().filter(|p| !p.is_empty())
    }

    /// Client, treating an empty string as absent.
    pub fn client_name(&self) -> Option<&str> {
        self.client.as_deref().filter(|c| !c.is_empty())
    }

    /// Field-by-field comparison ignoring `last_modified`.
    ///
    /// Timestamps are compared at millisecond precision, which is what the
    /// database keeps.
    pub fn same_content(&self, other: &Task) -> bool {
        self.exid == other.exid
            && self.id == other.id
            && self.description == other.description
            && self.project == other.project
            && self.client == other.client
            && self.complete == other.complete
            && self.completed_date == other.completed_date
            && self.deleted == other.deleted
            && self.most_recent_entry.timestamp_millis()
                == other.most_recent_entry.timestamp_millis()
            && self.total == other.total
            && self.timing_state == other.timing_state
            && self.synced == other.synced
    }
}
