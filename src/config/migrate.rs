use super::{default_page_size, default_recent_limit, default_sync_debounce_ms};
use crate::errors::{AppError, AppResult};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::info;

/// Keys introduced after the first release, with the value written for
/// config files that predate them.
fn added_keys() -> Vec<(&'static str, Value)> {
    vec![
        ("local_storage", Value::String(String::new())),
        ("todo_dir", Value::String(String::new())),
        ("sync_debounce_ms", Value::from(default_sync_debounce_ms())),
        ("recent_limit", Value::from(default_recent_limit() as u64)),
        ("page_size", Value::from(default_page_size() as u64)),
    ]
}

/// Add missing keys to the YAML config at `conf`, keeping existing values.
///
/// Returns the names of the keys that were added. A file that is not a YAML
/// mapping is left alone; parsing it later reports the problem.
pub fn add_missing_keys(conf: &Path) -> AppResult<Vec<&'static str>> {
    let content = fs::read_to_string(conf)?;

    let Ok(mut yaml) = serde_yaml::from_str::<Value>(&content) else {
        return Ok(Vec::new());
    };
    let Some(map) = yaml.as_mapping_mut() else {
        return Ok(Vec::new());
    };

    let mut added = Vec::new();
    for (key, value) in added_keys() {
        let key_value = Value::String(key.to_string());
        if !map.contains_key(&key_value) {
            map.insert(key_value, value);
            added.push(key);
        }
    }

    if added.is_empty() {
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&yaml)
        .map_err(|e| AppError::Config(format!("Failed to serialize {:?}: {}", conf, e)))?;
    fs::write(conf, serialized)?;

    info!(path = %conf.display(), keys = ?added, "config file upgraded");
    Ok(added)
}
