use crate::app::App;
use crate::cli::parser::Commands;
use crate::core::reducer::Action;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle `annotate` and `del-entry`.
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    match cmd {
        Commands::Annotate { id, text } => {
            app.dispatch(Action::AnnotateEntry {
                id: *id,
                annotation: text.join(" "),
            })
            .await?;
            success(format!("Entry {} annotated.", id));
        }
        Commands::DelEntry { id } => {
            app.dispatch(Action::DeleteEntry { id: *id }).await?;
            success(format!("Entry {} deleted.", id));
        }
        _ => {}
    }
    Ok(())
}
