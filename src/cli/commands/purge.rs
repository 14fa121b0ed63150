use crate::app::App;
use crate::cli::parser::Commands;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success, warning};

use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

/// Handle `purge`: permanent removal of a task and its entries.
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    if let Commands::Purge { exid, yes } = cmd {
        let prompt = format!(
            "Permanently delete task #{} and all its entries? This action is irreversible.",
            exid
        );
        if !*yes && !ask_confirmation(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        let db = app.db.lock().await;
        let entries = db.entries_for_task(exid)?;
        let removed = db.permanently_delete_task(exid)?;
        if removed == 0 && entries.is_empty() {
            return Err(AppError::UnknownTask(exid.clone()));
        }
        for entry in &entries {
            db.permanently_delete_entry(entry.id)?;
        }

        success(format!(
            "Task #{} purged ({} record(s), {} entr{}).",
            exid,
            removed,
            entries.len(),
            if entries.len() == 1 { "y" } else { "ies" }
        ));
    }

    Ok(())
}
