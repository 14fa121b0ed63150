//! SQLite connection wrapper for the task/entry database.

use crate::db::initialize::init_db;
use crate::errors::AppResult;
use crate::store::storage::KeyValueStorage;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handle shared between the archive adapter and the sync engine.
pub type SharedDb = Arc<Mutex<TimesheetDb>>;

pub struct TimesheetDb {
    pub conn: Connection,
    path: Option<String>,
}

impl TimesheetDb {
    /// Open the database file and bring its schema up to date.
    ///
    /// `legacy` is the local storage that may still hold a pre-database
    /// archive blob; it is imported once, when the stores are first created.
    pub fn open(path: &str, legacy: Option<&KeyValueStorage>) -> AppResult<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(Path::new(path))?;
        init_db(&conn, legacy)?;
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    pub fn open_in_memory(legacy: Option<&KeyValueStorage>) -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_db(&conn, legacy)?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn into_shared(self) -> SharedDb {
        Arc::new(Mutex::new(self))
    }
}
