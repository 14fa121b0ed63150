use crate::app::App;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::ui::messages::{field, info, success, warning};
use crate::sync::LINKS;

/// Handle `link`, `unlink` and `sync`.
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    match cmd {
        Commands::Link { kind, file } => {
            let name = file.as_deref().unwrap_or(kind.default_file());
            let handle = app.sync.pick(name).await?;
            app.sync.link(kind.link_id(), &handle).await?;
            success(format!("Linked {} file: {}", kind.link_id(), handle.path.display()));
        }
        Commands::Unlink { kind } => {
            if app.sync.unlink(kind.link_id()).await? {
                success(format!("Unlinked {} file.", kind.link_id()));
            } else {
                info(format!("No {} file was linked.", kind.link_id()));
            }
        }
        Commands::Sync => {
            for link in LINKS {
                match app.sync.linked(link).await? {
                    Some(handle) => field(link, handle.path.display()),
                    None => field(link, "(not linked)"),
                }
            }
            match app.sync_files().await? {
                None => warning("Nothing to sync: link a todo.txt file with `timesheet link todo`."),
                Some(0) => success("Files and tasks are in sync."),
                Some(changed) => success(format!("{} task(s) updated from files.", changed)),
            }
        }
        _ => {}
    }
    Ok(())
}
