//! Task/entry lifecycle state machine.
//!
//! `reduce` is a pure function from the current state and one action to the
//! next state. Every action is followed by a full recompute of gaps, task
//! totals, the clients list and daily stats, so derived values never drift
//! from the entries.

use crate::core::calculator::{gaps, stats, totals};
use crate::models::{AppState, NewEntry, PartialState, Settings, Task, TimingState};
use crate::sync::todo_txt::split_tokens;
use crate::utils::ids::fresh_id;
use chrono::{DateTime, Local};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Create a task from free text; `#exid`, `+project` and `client:name`
    /// tokens are extracted unless overridden.
    AddTask {
        raw: String,
        exid: Option<String>,
        client: Option<String>,
    },
    StartTask {
        exid: String,
    },
    StopTask {
        exid: String,
    },
    TaskComplete {
        exid: String,
        complete: bool,
    },
    TaskSyncChanged {
        exid: String,
        synced: bool,
    },
    DeleteTask {
        exid: String,
    },
    RestoreTask {
        exid: String,
    },
    UpdateTask {
        exid: String,
        description: Option<String>,
        project: Option<String>,
        client: Option<String>,
    },
    AnnotateEntry {
        id: i64,
        annotation: String,
    },
    DeleteEntry {
        id: i64,
    },
    ChangeSettings(Settings),
    /// Replace the working tasks, e.g. with the result of an inbound sync.
    ReplaceTasks(Vec<Task>),
}

/// Apply one action, then recompute all derived values.
pub fn reduce(state: AppState, action: &Action, now: DateTime<Local>) -> AppState {
    let state = match action {
        Action::AddTask { raw, exid, client } => {
            add_task(state, raw, exid.as_deref(), client.as_deref(), now)
        }
        Action::StartTask { exid } => start_task(state, exid, now),
        Action::StopTask { exid } => stop_task(state, exid, now),
        Action::TaskComplete { exid, complete } => task_complete(state, exid, *complete, now),
        Action::TaskSyncChanged { exid, synced } => task_sync_changed(state, exid, *synced),
        Action::DeleteTask { exid } => delete_task(state, exid, now),
        Action::RestoreTask { exid } => restore_task(state, exid),
        Action::UpdateTask {
            exid,
            description,
            project,
            client,
        } => update_task(state, exid, description, project, client),
        Action::AnnotateEntry { id, annotation } => annotate_entry(state, *id, annotation),
        Action::DeleteEntry { id } => delete_entry(state, *id),
        Action::ChangeSettings(settings) => AppState {
            settings: settings.clone(),
            ..state
        },
        Action::ReplaceTasks(tasks) => AppState {
            tasks: tasks.clone(),
            ..state
        },
    };

    recompute(state)
}

/// Apply actions in order; each is fully processed before the next.
pub fn reduce_all<'a>(
    state: AppState,
    actions: impl IntoIterator<Item = &'a Action>,
    now: DateTime<Local>,
) -> AppState {
    actions
        .into_iter()
        .fold(state, |state, action| reduce(state, action, now))
}

/// Build the working state from merged adapter output.
pub fn hydrate(partial: PartialState) -> AppState {
    recompute(partial.into_state())
}

/// Recompute gaps, totals, clients and stats from the entries.
pub fn recompute(mut state: AppState) -> AppState {
    gaps::apply_gaps(&mut state.entries);
    totals::apply_totals(&mut state.tasks, &state.entries);

    let mut clients: BTreeSet<String> = state.clients.drain(..).collect();
    clients.extend(
        state
            .tasks
            .iter()
            .filter_map(|t| t.client_name().map(str::to_string)),
    );
    state.clients = clients.into_iter().collect();

    state.stats = stats::daily_stats(&state.entries, &state.settings);
    state
}

/// Close the in-progress entry (if any) at `now` and append it to the entries.
fn finalize_open_entry(mut state: AppState, now: DateTime<Local>) -> AppState {
    if let Some(open) = state.new_entry.take() {
        let id = fresh_id(&now, state.highest_entry_id());
        let entry = open.finalize(id, now);
        debug!(task = %entry.task, id, "entry finalized");
        state.entries.push(entry);
    }
    for task in state.tasks.iter_mut() {
        task.timing_state = TimingState::Stop;
    }
    state
}

fn start_task(state: AppState, exid: &str, now: DateTime<Local>) -> AppState {
    if state.task(exid).is_none() {
        debug!(exid, "start ignored: unknown task");
        return state;
    }

    let mut state = finalize_open_entry(state, now);
    state.new_entry = Some(NewEntry::open(exid, now));
    state.current_task = Some(exid.to_string());
    if let Some(task) = state.task_mut(exid) {
        task.timing_state = TimingState::Start;
    }
    state
}

fn stop_task(state: AppState, exid: &str, now: DateTime<Local>) -> AppState {
    let mut state = finalize_open_entry(state, now);
    state.current_task = None;
    if let Some(task) = state.task_mut(exid) {
        task.timing_state = TimingState::Stop;
    }
    state
}

fn empty_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn add_task(
    mut state: AppState,
    raw: &str,
    exid: Option<&str>,
    client: Option<&str>,
    now: DateTime<Local>,
) -> AppState {
    let tokens = split_tokens(raw);
    let exid = empty_to_none(exid).or(tokens.exid);
    let client = empty_to_none(client).or(tokens.client);

    // An existing exid updates that task instead of adding a duplicate.
    if let Some(existing) = exid.as_deref().and_then(|e| state.task_mut(e)) {
        existing.description = tokens.description;
        if tokens.project.is_some() {
            existing.project = tokens.project;
        }
        if client.is_some() {
            existing.client = client;
        }
        existing.last_modified = now;
        return state;
    }

    let id = fresh_id(&now, state.highest_task_id());
    let exid = exid.unwrap_or_else(|| id.to_string());

    let mut task = Task::new(&exid, &tokens.description, now);
    task.id = id;
    task.project = tokens.project;
    task.client = client;
    task.most_recent_entry = now;

    state.tasks.push(task);
    state
}

fn task_complete(mut state: AppState, exid: &str, complete: bool, now: DateTime<Local>) -> AppState {
    let Some(task) = state.task_mut(exid) else {
        return state;
    };
    task.complete = complete;
    task.synced = complete;
    task.completed_date = complete.then(|| now.date_naive());

    for entry in state.entries.iter_mut().filter(|e| e.task == exid) {
        entry.synced = complete;
    }
    state
}

fn task_sync_changed(mut state: AppState, exid: &str, synced: bool) -> AppState {
    let Some(task) = state.task_mut(exid) else {
        return state;
    };
    task.synced = synced;

    for entry in state.entries.iter_mut().filter(|e| e.task == exid) {
        entry.synced = synced;
    }
    state
}

fn delete_task(mut state: AppState, exid: &str, now: DateTime<Local>) -> AppState {
    let Some(pos) = state.tasks.iter().position(|t| t.exid == exid) else {
        return state;
    };

    let timing_this = state.new_entry.as_ref().is_some_and(|e| e.task == exid);
    if timing_this {
        state = finalize_open_entry(state, now);
        state.current_task = None;
    }

    let mut task = state.tasks.remove(pos);
    task.deleted = true;
    task.timing_state = TimingState::Stop;

    state.deleted_tasks.retain(|t| t.exid != exid);
    state.deleted_tasks.push(task);
    state
}

fn restore_task(mut state: AppState, exid: &str) -> AppState {
    let Some(pos) = state.deleted_tasks.iter().position(|t| t.exid == exid) else {
        return state;
    };

    let mut task = state.deleted_tasks.remove(pos);
    task.deleted = false;
    state.tasks.push(task);
    state
}

fn update_task(
    mut state: AppState,
    exid: &str,
    description: &Option<String>,
    project: &Option<String>,
    client: &Option<String>,
) -> AppState {
    let Some(task) = state.task_mut(exid) else {
        return state;
    };
    if let Some(description) = description {
        task.description = description.trim().to_string();
    }
    if project.is_some() {
        task.project = empty_to_none(project.as_deref());
    }
    if client.is_some() {
        task.client = empty_to_none(client.as_deref());
    }
    state
}

fn annotate_entry(mut state: AppState, id: i64, annotation: &str) -> AppState {
    if let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) {
        entry.annotation = annotation.to_string();
    }
    state
}

fn delete_entry(mut state: AppState, id: i64) -> AppState {
    if let Some(entry) = state.entries.iter_mut().find(|e| e.id == id) {
        entry.deleted = true;
    }
    state
}
