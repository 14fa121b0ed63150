//! String key/value storage, the native counterpart of browser local and
//! session storage.
//!
//! A storage opened with a path persists every change to a JSON file (write
//! to a temp file, then rename). An in-memory storage lives as long as the
//! process, like a tab's session storage.

use crate::errors::AppResult;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct KeyValueStorage {
    path: Option<PathBuf>,
    items: Mutex<BTreeMap<String, String>>,
}

impl KeyValueStorage {
    /// Open (or create) a file-backed storage.
    ///
    /// A file that cannot be parsed is treated as empty and left in place
    /// until the next write replaces it.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let items = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed storage file, starting empty");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path),
            items: Mutex::new(items),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn items(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.items
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        let mut items = self.items();
        items.insert(key.to_string(), value.to_string());
        self.persist(&items)
    }

    fn persist(&self, items: &BTreeMap<String, String>) -> AppResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(items)?)?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), keys = items.len(), "storage persisted");
        Ok(())
    }
}
