//! Wiring of config, storage, database, store and sync engine, plus the
//! load → reduce → persist cycle every command goes through.

use crate::config::Config;
use crate::core::reducer::{Action, hydrate, reduce};
use crate::db::{SharedDb, TimesheetDb};
use crate::errors::{AppError, AppResult};
use crate::models::{AppState, Task};
use crate::store::{
    ArchiveAdapter, KeyValueStorage, LocalAdapter, ReadQuery, SessionAdapter, Store,
};
use crate::sync::{FileAccess, FsFileAccess, LINKS, SyncEngine};
use crate::utils::path::expand_tilde;
use chrono::Local;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub struct App {
    pub cfg: Config,
    pub db: SharedDb,
    pub store: Store,
    pub sync: SyncEngine,
    pub local: Arc<KeyValueStorage>,
    total_pages: watch::Receiver<usize>,
}

impl App {
    /// Open everything `cfg` points to, with todo files on the filesystem.
    pub fn open(cfg: Config) -> AppResult<Self> {
        let files = Arc::new(FsFileAccess::new(expand_tilde(&cfg.todo_dir)));
        Self::with_files(cfg, files)
    }

    pub fn with_files(cfg: Config, files: Arc<dyn FileAccess>) -> AppResult<Self> {
        cfg.validate()?;

        let local = Arc::new(KeyValueStorage::open(expand_tilde(&cfg.local_storage))?);
        let db_path = expand_tilde(&cfg.database);
        let db = TimesheetDb::open(&db_path.to_string_lossy(), Some(&local))?.into_shared();

        let archive = ArchiveAdapter::new(Arc::clone(&db));
        let total_pages = archive.total_pages();
        let store = Store::new(vec![
            Box::new(LocalAdapter::new(Arc::clone(&local))),
            Box::new(SessionAdapter::in_memory()),
            Box::new(archive),
        ]);
        let sync = SyncEngine::new(files, Arc::clone(&db), cfg.sync_debounce());

        Ok(Self {
            cfg,
            db,
            store,
            sync,
            local,
            total_pages,
        })
    }

    /// Number of archive pages found by the latest load.
    pub fn total_pages(&self) -> usize {
        *self.total_pages.borrow()
    }

    /// Read all adapters and build the working state.
    pub async fn load(&self, query: &ReadQuery) -> AppResult<AppState> {
        let read = self.store.read(query).await;
        for e in &read.errors {
            warn!(error = %e, "partial state loaded");
        }
        Ok(hydrate(read.state))
    }

    /// Persist `state`, then push all live tasks to the linked files.
    pub async fn commit(&self, state: &AppState) -> AppResult<()> {
        let failed = self.store.write(state).await;
        if failed > 0 {
            warn!(failed, "some adapters were not written");
        }

        if self.any_linked().await {
            let tasks = self.live_tasks().await?;
            self.sync.sync_outbound(tasks);
            self.sync.flush().await;
        }
        Ok(())
    }

    /// Load, fold in edits made to the linked files, apply `action`,
    /// persist. Returns the new state.
    pub async fn dispatch(&self, action: Action) -> AppResult<AppState> {
        let mut state = self.load(&ReadQuery::default()).await?;
        if self.any_linked().await {
            let (merged, changed) = self.merge_files(state).await?;
            if let Some(changed) = changed.filter(|&n| n > 0) {
                debug!(changed, "file edits folded in before dispatch");
            }
            state = merged;
        }
        let state = self.prepare(state, &action).await?;
        let state = reduce(state, &action, Local::now());
        self.commit(&state).await?;
        Ok(state)
    }

    /// Bring records the action refers to into the working set when they
    /// are stored but not part of today's view.
    async fn prepare(&self, mut state: AppState, action: &Action) -> AppResult<AppState> {
        match action {
            Action::StartTask { exid }
            | Action::TaskComplete { exid, .. }
            | Action::TaskSyncChanged { exid, .. }
            | Action::DeleteTask { exid }
            | Action::UpdateTask { exid, .. } => {
                if state.task(exid).is_none() {
                    let stored = self.stored_task(exid).await?;
                    match stored {
                        Some(task) if !task.deleted => state.tasks.push(task),
                        _ => return Err(AppError::UnknownTask(exid.clone())),
                    }
                }
            }
            Action::RestoreTask { exid } => {
                if !state.deleted_tasks.iter().any(|t| &t.exid == exid) {
                    match self.stored_task(exid).await? {
                        Some(task) if task.deleted => state.deleted_tasks.push(task),
                        _ => return Err(AppError::UnknownTask(exid.clone())),
                    }
                }
            }
            Action::AnnotateEntry { id, .. } | Action::DeleteEntry { id } => {
                if !state.entries.iter().any(|e| e.id == *id) {
                    let stored = self.db.lock().await.get_entry(*id)?;
                    match stored {
                        Some(entry) => state.entries.push(entry),
                        None => {
                            return Err(AppError::NotFound {
                                store: "entries",
                                key: id.to_string(),
                            });
                        }
                    }
                }
            }
            _ => {}
        }
        Ok(state)
    }

    async fn stored_task(&self, exid: &str) -> AppResult<Option<Task>> {
        self.db.lock().await.get_task(exid)
    }

    /// Every non-deleted task in the database.
    pub async fn live_tasks(&self) -> AppResult<Vec<Task>> {
        let all = self.db.lock().await.get_all_tasks()?;
        Ok(all.into_iter().filter(|t| !t.deleted).collect())
    }

    pub async fn any_linked(&self) -> bool {
        for link in LINKS {
            if matches!(self.sync.linked(link).await, Ok(Some(_))) {
                return true;
            }
        }
        false
    }

    /// Merge the linked files into the stored tasks and persist the result.
    ///
    /// Returns `None` when no sync was performed, otherwise the number of
    /// tasks the files added or changed.
    pub async fn sync_files(&self) -> AppResult<Option<usize>> {
        let state = self.load(&ReadQuery::default()).await?;
        let (state, changed) = self.merge_files(state).await?;
        if changed.is_some() {
            self.commit(&state).await?;
        }
        Ok(changed)
    }

    /// Replace the working tasks of `state` with the result of merging the
    /// linked files into all live tasks. Nothing is persisted.
    async fn merge_files(&self, state: AppState) -> AppResult<(AppState, Option<usize>)> {
        let known = self.live_tasks().await?;
        let Some(merged) = self.sync.sync_inbound(&known).await else {
            return Ok((state, None));
        };

        let stored: HashMap<&str, &Task> = known.iter().map(|t| (t.exid.as_str(), t)).collect();
        let today: HashSet<&str> = state.tasks.iter().map(|t| t.exid.as_str()).collect();

        let mut changed = 0;
        let mut working = Vec::new();
        for task in merged {
            let is_change = stored
                .get(task.exid.as_str())
                .is_none_or(|s| !s.same_content(&task));
            if is_change {
                changed += 1;
            }
            // Untouched tasks from earlier days stay out of today's view.
            if is_change || today.contains(task.exid.as_str()) {
                working.push(task);
            }
        }
        debug!(changed, working = working.len(), "inbound sync merged");

        let state = reduce(state, &Action::ReplaceTasks(working), Local::now());
        Ok((state, Some(changed)))
    }
}
