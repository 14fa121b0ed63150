use crate::app::App;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::ui::messages::{field, header};
use crate::utils::colors::{CYAN, GREEN, RED, RESET};

pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    if let Commands::Db { info, check } = cmd {
        let db = app.db.lock().await;

        //
        // 1) INFO
        //
        if *info {
            let stats = db.db_info()?;

            header("Database");
            field("Path", db.path().unwrap_or(":memory:"));
            field("Schema version", stats.schema_version);
            field("File size", format!("{:.1} KiB", stats.file_size as f64 / 1024.0));
            field("Tasks", stats.tasks);
            field("Deleted tasks", stats.deleted_tasks);
            field("Entries", stats.entries);
            field("Linked files", stats.links);
            if let (Some(first), Some(last)) = (stats.first_entry, stats.last_entry) {
                field(
                    "Entry range",
                    format!("{} → {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
                );
            }
            if let Some(per_day) = stats.entries_per_day() {
                field("Entries/day", format!("{per_day:.1}"));
            }
        }

        //
        // 2) CHECK
        //
        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);

            let integrity: String = db
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}", RED, RESET, integrity);
            }
        }
    }

    Ok(())
}
