use crate::app::App;
use crate::config::Config;
use crate::db::log;
use crate::db::migrate::user_version;
use crate::errors::AppResult;
use crate::ui::messages::{field, info, success, warning};
use std::path::Path;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (an existing file is kept)
///  - the todo directory
///  - the SQLite database, running all pending migrations (including the
///    one-time import of a legacy archive found in local storage)
pub async fn handle(cfg: &Config, dir: &Path) -> AppResult<()> {
    let path = cfg.init_all(dir)?;

    info("Initializing timesheet…");
    field("Config file", path.display());
    field("Database", &cfg.database);
    field("Local storage", &cfg.local_storage);
    field("Todo directory", &cfg.todo_dir);

    let app = App::open(cfg.clone())?;
    let db = app.db.lock().await;

    if let Err(e) = log::ttlog(
        &db.conn,
        "init",
        "database",
        &format!("Database initialized at {}", cfg.database),
    ) {
        warning(format!("Failed to write internal log: {}", e));
    }

    success(format!(
        "Database ready (schema version {})",
        user_version(&db.conn)?
    ));
    Ok(())
}
