//! Database adapter: durable tasks and entries.
//!
//! Reads return today's working set plus one searched, paginated page of the
//! archive. The number of archive pages is published on a watch channel for
//! whoever renders pagination.

use crate::db::{SharedDb, TimesheetDb, UpdateOptions};
use crate::errors::{AppError, AppResult};
use crate::models::{AppState, Archive, PartialState, Task};
use crate::store::{ReadQuery, StateAdapter};
use crate::utils::date::today;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashSet;
use tokio::sync::watch;
use tracing::{debug, warn};

pub struct ArchiveAdapter {
    db: SharedDb,
    total_pages: watch::Sender<usize>,
}

impl ArchiveAdapter {
    pub fn new(db: SharedDb) -> Self {
        let (total_pages, _) = watch::channel(0);
        Self { db, total_pages }
    }

    /// Total number of archive pages as of the latest read.
    pub fn total_pages(&self) -> watch::Receiver<usize> {
        self.total_pages.subscribe()
    }
}

fn page_count(matches: usize, page_size: usize) -> usize {
    match page_size {
        0 => usize::from(matches > 0),
        size => matches.div_ceil(size),
    }
}

fn read_working_set(
    db: &TimesheetDb,
    day: NaiveDate,
    query: &ReadQuery,
) -> AppResult<(PartialState, usize)> {
    let tasks = db.tasks_on_day(day)?;
    let entries = db.entries_on_day(day)?;

    let (page, matches) = db.search_tasks(query.search.as_deref(), query.page, query.page_size)?;
    let mut page_entries = Vec::new();
    for task in &page {
        page_entries.extend(
            db.entries_for_task(&task.exid)?
                .into_iter()
                .filter(|e| !e.deleted),
        );
    }

    let partial = PartialState {
        tasks: Some(tasks),
        entries: Some(entries),
        archive: Some(Archive {
            tasks: page,
            entries: page_entries,
        }),
        ..PartialState::default()
    };
    Ok((partial, page_count(matches, query.page_size)))
}

fn tally<T>(result: AppResult<T>, store: &str, key: &str) -> usize {
    match result {
        Ok(_) => 0,
        Err(e) => {
            warn!(store, key, error = %e, "record not saved");
            1
        }
    }
}

/// Upsert every record; returns the number that could not be saved.
///
/// Deletion markers go first so that a live task reusing a deleted task's
/// exid does not collide with it. Archive page records that are also in the
/// working set are skipped; the working copy is the newer one.
fn write_records(db: &TimesheetDb, state: &AppState) -> AppResult<usize> {
    let tx = db.conn.unchecked_transaction()?;
    let working = UpdateOptions::default();
    let archived = UpdateOptions::preserving_timestamp();

    let mut failed = 0;
    let mut seen_tasks: HashSet<&str> = HashSet::new();
    let mut seen_entries: HashSet<i64> = HashSet::new();

    for task in &state.deleted_tasks {
        seen_tasks.insert(&task.exid);
        let marked = Task {
            deleted: true,
            ..task.clone()
        };
        failed += tally(db.upsert_task(&marked, working), "tasks", &task.exid);
    }
    for task in &state.tasks {
        seen_tasks.insert(&task.exid);
        failed += tally(db.upsert_task(task, working), "tasks", &task.exid);
    }
    for task in &state.archive.tasks {
        if seen_tasks.insert(&task.exid) {
            failed += tally(db.upsert_task(task, archived), "tasks", &task.exid);
        }
    }

    let entries = state
        .entries
        .iter()
        .map(|e| (e, working))
        .chain(state.archive.entries.iter().map(|e| (e, archived)));
    for (entry, opts) in entries {
        if seen_entries.insert(entry.id) {
            failed += tally(db.upsert_entry(entry, opts), "entries", &entry.id.to_string());
        }
    }

    tx.commit()?;
    Ok(failed)
}

#[async_trait]
impl StateAdapter for ArchiveAdapter {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn read(&self, query: &ReadQuery) -> AppResult<PartialState> {
        let (partial, pages) = {
            let db = self.db.lock().await;
            read_working_set(&db, today(), query)?
        };

        self.total_pages.send_replace(pages);
        debug!(pages, page = query.page, "archive read");
        Ok(partial)
    }

    async fn write(&self, state: &AppState) -> AppResult<()> {
        let failed = {
            let db = self.db.lock().await;
            write_records(&db, state)?
        };

        if failed > 0 {
            return Err(AppError::Other(format!("{failed} record(s) not saved")));
        }
        Ok(())
    }
}
