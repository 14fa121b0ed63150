//! Task totals, recomputed from scratch out of the entries.

use crate::models::{Entry, Task};
use crate::utils::time::round_hours;
use chrono::{DateTime, Local};
use std::collections::HashMap;

/// Aggregate of the finished, live entries of one task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskTotal {
    pub hours: f64,
    pub synced: bool,
    pub most_recent_entry: DateTime<Local>,
}

/// Group finished, non-deleted entries by task.
pub fn totals_by_task(entries: &[Entry]) -> HashMap<&str, TaskTotal> {
    let mut totals: HashMap<&str, TaskTotal> = HashMap::new();

    for entry in entries.iter().filter(|e| !e.deleted) {
        let Some(hours) = entry.duration_hours() else {
            continue;
        };

        totals
            .entry(entry.task.as_str())
            .and_modify(|t| {
                t.hours += hours;
                t.synced &= entry.synced;
                t.most_recent_entry = t.most_recent_entry.max(entry.start);
            })
            .or_insert(TaskTotal {
                hours,
                synced: entry.synced,
                most_recent_entry: entry.start,
            });
    }

    totals
}

/// Merge the aggregates back onto the tasks.
///
/// Tasks without finished entries get a zero total and keep their
/// `synced` and `most_recent_entry` values.
pub fn apply_totals(tasks: &mut [Task], entries: &[Entry]) {
    let totals = totals_by_task(entries);

    for task in tasks.iter_mut() {
        match totals.get(task.exid.as_str()) {
            Some(total) => {
                task.total = round_hours(total.hours);
                task.synced = total.synced;
                task.most_recent_entry = total.most_recent_entry;
            }
            None => task.total = 0.0,
        }
    }
}
