//! Reconcile the app's tasks with tasks parsed from todo.txt files.
//!
//! The file is authoritative for what a task *says* (description, project,
//! client, completion); the app is authoritative for everything tracked
//! about it (id, totals, timing, sync flags).

use crate::models::Task;
use crate::utils::ids::fresh_id;
use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Merge `file_tasks` into `app_tasks`, keyed by `exid`.
///
/// - File tasks without an exid are ignored.
/// - App-only tasks pass through unchanged.
/// - File-only tasks are added with a fresh id and `last_modified = now`.
/// - Matching tasks take the file's descriptive fields and `last_modified = now`.
///
/// Output order is app tasks in their original order followed by new file
/// tasks in file order.
pub fn merge_tasks(app_tasks: &[Task], file_tasks: &[Task], now: DateTime<Local>) -> Vec<Task> {
    let mut merged: Vec<Task> = app_tasks.to_vec();
    let mut index: HashMap<String, usize> = HashMap::new();
    for (i, task) in merged.iter().enumerate() {
        if task.has_exid() {
            index.entry(task.exid.clone()).or_insert(i);
        }
    }

    let mut highest_id = merged.iter().map(|t| t.id).max();

    for file_task in file_tasks.iter().filter(|t| t.has_exid()) {
        match index.get(&file_task.exid) {
            Some(&i) => {
                let existing = &mut merged[i];
                existing.description = file_task.description.clone();
                existing.project = file_task.project.clone();
                existing.client = file_task.client.clone();
                existing.complete = file_task.complete;
                existing.completed_date = file_task.completed_date;
                existing.last_modified = now;
            }
            None => {
                let id = fresh_id(&now, highest_id);
                highest_id = Some(id);

                let mut task = Task::new(&file_task.exid, &file_task.description, now);
                task.id = id;
                task.project = file_task.project.clone();
                task.client = file_task.client.clone();
                task.complete = file_task.complete;
                task.completed_date = file_task.completed_date;
                task.deleted = false;

                index.insert(task.exid.clone(), merged.len());
                merged.push(task);
            }
        }
    }

    merged
}
