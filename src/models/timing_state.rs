use serde::{Deserialize, Serialize};

/// Whether a task is currently being timed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingState {
    Start,
    #[default]
    Stop,
}

impl TimingState {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TimingState::Start => "start",
            TimingState::Stop => "stop",
        }
    }

    /// Convert DB string → enum. Unknown values are treated as idle.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "start" => TimingState::Start,
            _ => TimingState::Stop,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimingState::Start)
    }
}
