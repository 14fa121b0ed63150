use crate::app::App;
use crate::cli::parser::Commands;
use crate::core::reducer::Action;
use crate::errors::AppResult;
use crate::models::AppState;
use crate::ui::messages::{info, success, warning};
use crate::utils::format_hours;

fn action_for(cmd: &Commands, state_hint: Option<&str>) -> Option<Action> {
    let action = match cmd {
        Commands::Add { text, exid, client } => Action::AddTask {
            raw: text.join(" "),
            exid: exid.clone(),
            client: client.clone(),
        },
        Commands::Edit {
            exid,
            description,
            project,
            client,
        } => Action::UpdateTask {
            exid: exid.clone(),
            description: description.clone(),
            project: project.clone(),
            client: client.clone(),
        },
        Commands::Start { exid } => Action::StartTask { exid: exid.clone() },
        Commands::Stop { exid } => Action::StopTask {
            exid: exid.clone().or(state_hint.map(str::to_string))?,
        },
        Commands::Done { exid, undo } => Action::TaskComplete {
            exid: exid.clone(),
            complete: !undo,
        },
        Commands::Synced { exid, undo } => Action::TaskSyncChanged {
            exid: exid.clone(),
            synced: !undo,
        },
        Commands::Del { exid } => Action::DeleteTask { exid: exid.clone() },
        Commands::Restore { exid } => Action::RestoreTask { exid: exid.clone() },
        _ => return None,
    };
    Some(action)
}

fn report(action: &Action, state: &AppState) {
    match action {
        Action::AddTask { .. } => match state.tasks.iter().max_by_key(|t| t.last_modified) {
            Some(task) => success(format!("Task #{} saved: {}", task.exid, task.description)),
            None => success("Task saved."),
        },
        Action::UpdateTask { exid, .. } => success(format!("Task #{} updated.", exid)),
        Action::StartTask { exid } => success(format!("Timing #{}.", exid)),
        Action::StopTask { exid } => {
            let total = state.task(exid).map(|t| t.total).unwrap_or_default();
            success(format!(
                "Stopped #{} ({} today).",
                exid,
                format_hours(total)
            ));
        }
        Action::TaskComplete { exid, complete } => {
            if *complete {
                success(format!("Task #{} completed.", exid));
            } else {
                success(format!("Task #{} reopened.", exid));
            }
        }
        Action::TaskSyncChanged { exid, synced } => {
            if *synced {
                success(format!("Task #{} marked as synced.", exid));
            } else {
                success(format!("Task #{} marked as not synced.", exid));
            }
        }
        Action::DeleteTask { exid } => {
            success(format!("Task #{} deleted.", exid));
            info(format!("Undo with `timesheet restore {}`.", exid));
        }
        Action::RestoreTask { exid } => success(format!("Task #{} restored.", exid)),
        _ => {}
    }
}

/// Handle the task lifecycle commands (`add`, `edit`, `start`, `stop`,
/// `done`, `synced`, `del`, `restore`).
pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    let current = if matches!(cmd, Commands::Stop { exid: None }) {
        app.load(&Default::default()).await?.current_task
    } else {
        None
    };

    let Some(action) = action_for(cmd, current.as_deref()) else {
        warning("No task is currently timing.");
        return Ok(());
    };

    let state = app.dispatch(action.clone()).await?;
    report(&action, &state);
    Ok(())
}
