use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod migrate; // fills in keys added after a config file was written

pub const CONFIG_FILE: &str = "timesheet.conf";
pub const DATABASE_FILE: &str = "timesheet.sqlite";
pub const LOCAL_STORAGE_FILE: &str = "local_storage.json";
pub const TODO_DIR: &str = "todo";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database with tasks, entries and file links.
    #[serde(default)]
    pub database: String,
    /// JSON file standing in for the browser's local storage.
    #[serde(default)]
    pub local_storage: String,
    /// Directory where linked todo.txt/done.txt files are picked.
    #[serde(default)]
    pub todo_dir: String,
    #[serde(default = "default_sync_debounce_ms")]
    pub sync_debounce_ms: u64,
    /// Number of previous tasks offered by `list --history`.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

pub(crate) fn default_sync_debounce_ms() -> u64 {
    500
}
pub(crate) fn default_recent_limit() -> usize {
    crate::db::RECENT_TASKS_LIMIT
}
pub(crate) fn default_page_size() -> usize {
    20
}

impl Config {
    /// Defaults with every path inside `dir`.
    pub fn defaults_in(dir: &Path) -> Self {
        Self {
            database: dir.join(DATABASE_FILE).to_string_lossy().to_string(),
            local_storage: dir.join(LOCAL_STORAGE_FILE).to_string_lossy().to_string(),
            todo_dir: dir.join(TODO_DIR).to_string_lossy().to_string(),
            sync_debounce_ms: default_sync_debounce_ms(),
            recent_limit: default_recent_limit(),
            page_size: default_page_size(),
        }
    }

    /// The configuration directory: `home` if given, `~/.timesheet` otherwise.
    pub fn config_dir(home: Option<&Path>) -> PathBuf {
        match home {
            Some(dir) => dir.to_path_buf(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".timesheet"),
        }
    }

    pub fn config_file(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Load the configuration stored in `dir`, or defaults if there is none.
    ///
    /// Empty path settings fall back to their defaults inside `dir`.
    pub fn load(dir: &Path) -> AppResult<Self> {
        let path = Self::config_file(dir);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::defaults_in(dir));
        }

        migrate::add_missing_keys(&path)?;
        let content = fs::read_to_string(&path)?;
        let mut cfg: Config = serde_yaml::from_str(&content)?;
        cfg.fill_paths(dir);
        Ok(cfg)
    }

    fn fill_paths(&mut self, dir: &Path) {
        let defaults = Self::defaults_in(dir);
        for (value, default) in [
            (&mut self.database, defaults.database),
            (&mut self.local_storage, defaults.local_storage),
            (&mut self.todo_dir, defaults.todo_dir),
        ] {
            if value.trim().is_empty() {
                *value = default;
            }
        }
    }

    /// Write the configuration file into `dir`. Returns its path.
    pub fn save(&self, dir: &Path) -> AppResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = Self::config_file(dir);
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&path, yaml)?;
        Ok(path)
    }

    /// Create the config file (unless present), the todo directory and the
    /// parent of the database file.
    pub fn init_all(&self, dir: &Path) -> AppResult<PathBuf> {
        let path = Self::config_file(dir);
        if !path.exists() {
            self.save(dir)?;
        }
        fs::create_dir_all(&self.todo_dir)?;
        match Path::new(&self.database).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)?,
            _ => {}
        }
        Ok(path)
    }

    pub fn sync_debounce(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.sync_debounce_ms)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.database.trim().is_empty() {
            return Err(AppError::Config("database path is empty".into()));
        }
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".into()));
        }
        Ok(())
    }
}
