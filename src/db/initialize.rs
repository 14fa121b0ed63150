use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use crate::store::storage::KeyValueStorage;
use rusqlite::Connection;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &Connection, legacy: Option<&KeyValueStorage>) -> AppResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    run_pending_migrations(conn, legacy)?;
    Ok(())
}
