//! Versioned schema upgrades and the one-time import of the legacy archive.
//!
//! The schema version lives in `PRAGMA user_version`. Each upgrade creates
//! its store only when it does not exist yet, and imports legacy records only
//! right after creating it.

use crate::db::log::ttlog;
use crate::db::queries::{insert_entry, insert_task};
use crate::errors::{AppError, AppResult};
use crate::models::timestamp::parse_value;
use crate::models::{Entry, Task};
use crate::store::storage::KeyValueStorage;
use crate::utils::ids::fresh_id;
use chrono::Local;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use tracing::{info, warn};

pub const DB_VERSION: u32 = 3;

/// Local storage key of the legacy flat state blob.
pub const LEGACY_KEY: &str = "timesheet";
/// Local storage key of the snapshot taken before the state blob was migrated.
pub const BACKUP_KEY: &str = "timesheetBackup";

/// Ensure that the `log` table exists.
fn ensure_log_table(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn table_exists(conn: &Connection, name: &str) -> AppResult<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

pub fn user_version(conn: &Connection) -> AppResult<u32> {
    let v: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    Ok(v.max(0) as u32)
}

fn set_user_version(conn: &Connection, version: u32) -> AppResult<()> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))?;
    Ok(())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> AppResult<()> {
    ttlog(conn, "migration_applied", version, message)
}

fn create_tasks_store(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS tasks (
            id                INTEGER PRIMARY KEY,
            exid              TEXT NOT NULL,
            description       TEXT NOT NULL DEFAULT '',
            project           TEXT,
            client            TEXT,
            complete          INTEGER NOT NULL DEFAULT 0,
            completed_date    TEXT,
            deleted           INTEGER NOT NULL DEFAULT 0,
            last_modified     INTEGER NOT NULL,
            most_recent_entry INTEGER NOT NULL,
            total             REAL NOT NULL DEFAULT 0,
            timing_state      TEXT NOT NULL DEFAULT 'stop' CHECK(timing_state IN ('start','stop')),
            synced            INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )?;
    Ok(())
}

fn create_entries_store(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id            INTEGER PRIMARY KEY,
            task          TEXT NOT NULL,
            annotation    TEXT NOT NULL DEFAULT '',
            started_at    INTEGER NOT NULL,
            ended_at      INTEGER,
            synced        INTEGER NOT NULL DEFAULT 0,
            deleted       INTEGER NOT NULL DEFAULT 0,
            last_modified INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn create_file_handles_store(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS file_handles (
            link_id    TEXT PRIMARY KEY,
            path       TEXT NOT NULL,
            name       TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Indexes are always (re)asserted; creation is idempotent.
fn ensure_indexes(conn: &Connection) -> AppResult<()> {
    if table_exists(conn, "tasks")? {
        conn.execute_batch(
            r#"
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tasks_exid ON tasks(exid) WHERE deleted = 0;
            CREATE INDEX IF NOT EXISTS idx_tasks_client ON tasks(client);
            CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks(project);
            CREATE INDEX IF NOT EXISTS idx_tasks_last_modified ON tasks(last_modified);
            "#,
        )?;
    }
    if table_exists(conn, "entries")? {
        conn.execute_batch(
            r#"
            CREATE INDEX IF NOT EXISTS idx_entries_task ON entries(task);
            CREATE INDEX IF NOT EXISTS idx_entries_start ON entries(started_at);
            "#,
        )?;
    }
    Ok(())
}

/// The legacy archive, from the state blob or, failing that, its backup.
///
/// A blob that is missing, malformed or carries no `archive` object is
/// skipped in favour of the backup.
fn load_legacy_archive(legacy: Option<&KeyValueStorage>) -> Option<Value> {
    let storage = legacy?;

    for key in [LEGACY_KEY, BACKUP_KEY] {
        let Some(raw) = storage.get_item(key) else {
            continue;
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(mut blob) => {
                if let Some(archive) = blob.get_mut("archive").filter(|a| a.is_object()) {
                    info!(key, "legacy archive found");
                    return Some(archive.take());
                }
            }
            Err(e) => warn!(key, error = %e, "legacy blob is not valid JSON"),
        }
    }
    None
}

fn legacy_records<'a>(archive: Option<&'a Value>, field: &str) -> &'a [Value] {
    archive
        .and_then(|a| a.get(field))
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Import legacy tasks. Returns the number of imported records.
fn import_legacy_tasks(conn: &Connection, archive: Option<&Value>) -> usize {
    let now = Local::now();
    let mut highest: Option<i64> = None;
    let mut imported = 0;

    for (i, raw) in legacy_records(archive, "tasks").iter().enumerate() {
        let mut task: Task = match serde_json::from_value(raw.clone()) {
            Ok(t) => t,
            Err(e) => {
                warn!(index = i, error = %e, "skipping unreadable legacy task");
                continue;
            }
        };

        if task.id == 0 {
            task.id = fresh_id(&now, highest);
        }
        highest = highest.max(Some(task.id));
        if !task.has_exid() {
            task.exid = task.id.to_string();
        }
        if raw.get("lastModified").and_then(parse_value).is_none() {
            task.last_modified = now;
        }

        match insert_task(conn, &task) {
            Ok(()) => imported += 1,
            Err(e) => warn!(exid = %task.exid, error = %e, "legacy task not imported"),
        }
    }
    imported
}

/// Import legacy entries. Returns the number of imported records.
fn import_legacy_entries(conn: &Connection, archive: Option<&Value>) -> usize {
    let now = Local::now();
    let mut highest: Option<i64> = None;
    let mut imported = 0;

    for (i, raw) in legacy_records(archive, "entries").iter().enumerate() {
        let mut entry: Entry = match serde_json::from_value(raw.clone()) {
            Ok(e) => e,
            Err(e) => {
                warn!(index = i, error = %e, "skipping unreadable legacy entry");
                continue;
            }
        };

        if entry.id == 0 {
            entry.id = fresh_id(&now, highest);
        }
        highest = highest.max(Some(entry.id));
        if raw.get("lastModified").and_then(parse_value).is_none() {
            entry.last_modified = now;
        }

        match insert_entry(conn, &entry) {
            Ok(()) => imported += 1,
            Err(e) => warn!(id = entry.id, error = %e, "legacy entry not imported"),
        }
    }
    imported
}

/// v1: `tasks` store, plus legacy task import when the store is new.
fn upgrade_v1(conn: &Connection, legacy: Option<&KeyValueStorage>) -> AppResult<()> {
    if table_exists(conn, "tasks")? {
        return Ok(());
    }
    create_tasks_store(conn)?;
    ensure_indexes(conn)?;

    let archive = load_legacy_archive(legacy);
    let imported = import_legacy_tasks(conn, archive.as_ref());
    mark_applied(
        conn,
        "v1_tasks_store",
        &format!("Created tasks store, imported {imported} legacy tasks"),
    )?;
    info!(imported, "tasks store created");
    Ok(())
}

/// v2: `entries` store, plus legacy entry import when the store is new.
fn upgrade_v2(conn: &Connection, legacy: Option<&KeyValueStorage>) -> AppResult<()> {
    if table_exists(conn, "entries")? {
        return Ok(());
    }
    create_entries_store(conn)?;
    ensure_indexes(conn)?;

    let archive = load_legacy_archive(legacy);
    let imported = import_legacy_entries(conn, archive.as_ref());
    mark_applied(
        conn,
        "v2_entries_store",
        &format!("Created entries store, imported {imported} legacy entries"),
    )?;
    info!(imported, "entries store created");
    Ok(())
}

/// v3: `file_handles` store for linked todo.txt files.
fn upgrade_v3(conn: &Connection) -> AppResult<()> {
    if table_exists(conn, "file_handles")? {
        return Ok(());
    }
    create_file_handles_store(conn)?;
    mark_applied(conn, "v3_file_handles_store", "Created file_handles store")?;
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked by db::init_db().
pub fn run_pending_migrations(conn: &Connection, legacy: Option<&KeyValueStorage>) -> AppResult<()> {
    ensure_log_table(conn)?;

    let current = user_version(conn)?;
    if current > DB_VERSION {
        return Err(AppError::Migration(format!(
            "database version {current} is newer than supported version {DB_VERSION}"
        )));
    }

    if current < DB_VERSION {
        let tx = conn.unchecked_transaction()?;
        if current < 1 {
            upgrade_v1(&tx, legacy)?;
        }
        if current < 2 {
            upgrade_v2(&tx, legacy)?;
        }
        if current < 3 {
            upgrade_v3(&tx)?;
        }
        set_user_version(&tx, DB_VERSION)?;
        tx.commit()?;
        info!(from = current, to = DB_VERSION, "database schema upgraded");
    }

    ensure_indexes(conn)?;
    Ok(())
}
