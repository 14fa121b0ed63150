use serde::{Deserialize, Serialize};

/// Global user settings, persisted by the local adapter only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Hourly rate.
    #[serde(default)]
    pub rate: f64,
    /// Tax, in percent.
    #[serde(default)]
    pub tax: f64,
    /// Focus interval, in hours.
    #[serde(default = "default_focus_interval")]
    pub focus_interval: f64,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_focus_interval() -> f64 {
    0.5
}

fn default_color() -> String {
    "#4a90d9".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate: 0.0,
            tax: 0.0,
            focus_interval: default_focus_interval(),
            color: default_color(),
        }
    }
}
