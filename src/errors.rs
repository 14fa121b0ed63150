//! Unified application error type.
//! All modules (db, store, sync, core, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use rusqlite::ErrorCode;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    /// Duplicate logical key on insert. Recoverable: callers fall back to update.
    #[error("Constraint violation in '{store}': key '{key}' already exists")]
    Constraint { store: &'static str, key: String },

    #[error("No record in '{store}' with key '{key}'")]
    NotFound { store: &'static str, key: String },

    // ---------------------------
    // Serialization
    // ---------------------------
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ---------------------------
    // Store / sync
    // ---------------------------
    #[error("{adapter} adapter failed: {source}")]
    Adapter {
        adapter: &'static str,
        #[source]
        source: Box<AppError>,
    },

    #[error("Permission denied for file '{0}'")]
    Permission(String),

    #[error("Task '{0}' not found")]
    UnknownTask(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Classify a rusqlite failure: unique-index violations become `Constraint`.
    pub fn from_insert(err: rusqlite::Error, store: &'static str, key: &str) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
                AppError::Constraint {
                    store,
                    key: key.to_string(),
                }
            }
            _ => AppError::Db(err),
        }
    }

    pub fn is_constraint(&self) -> bool {
        matches!(self, AppError::Constraint { .. })
    }

    /// Wrap an error with the name of the adapter that produced it.
    pub fn in_adapter(self, adapter: &'static str) -> Self {
        AppError::Adapter {
            adapter,
            source: Box::new(self),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
