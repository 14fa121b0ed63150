//! Two-way sync between the app's tasks and linked todo.txt/done.txt files.
//!
//! Inbound sync reads both linked files and merges them into the app's
//! tasks. Outbound sync is debounced: a single pending write, replaced by
//! every new request, fires once the debounce delay has passed.

use crate::db::SharedDb;
use crate::errors::AppResult;
use crate::models::Task;
use crate::sync::files::{FileAccess, FileHandle};
use crate::sync::merge::merge_tasks;
use crate::sync::todo_txt::{parse_todo_txt, tasks_to_done_txt, tasks_to_todo_txt};
use chrono::Local;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const TODO_LINK: &str = "todo";
pub const DONE_LINK: &str = "done";
pub const LINKS: [&str; 2] = [TODO_LINK, DONE_LINK];

pub struct SyncEngine {
    files: Arc<dyn FileAccess>,
    db: SharedDb,
    debounce: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

/// The handle linked as `link`, if any and if it is still accessible.
///
/// A handle that fails the permission check counts as unlinked.
async fn usable_handle(files: &dyn FileAccess, db: &SharedDb, link: &str) -> Option<FileHandle> {
    let stored = db.lock().await.get_link(link);
    let handle = match stored {
        Ok(Some(handle)) => handle,
        Ok(None) => return None,
        Err(e) => {
            warn!(link, error = %e, "could not load file link");
            return None;
        }
    };

    if files.verify_permission(&handle).await {
        Some(handle)
    } else {
        warn!(link, file = %handle.name, "permission denied, skipping file");
        None
    }
}

async fn write_linked(files: &dyn FileAccess, db: &SharedDb, tasks: &[Task]) {
    for link in LINKS {
        let Some(handle) = usable_handle(files, db, link).await else {
            continue;
        };
        let text = if link == TODO_LINK {
            tasks_to_todo_txt(tasks)
        } else {
            tasks_to_done_txt(tasks)
        };
        match files.write_file(&handle, &text).await {
            Ok(()) => debug!(link, file = %handle.name, "file written"),
            Err(e) => warn!(link, file = %handle.name, error = %e, "outbound sync failed"),
        }
    }
}

impl SyncEngine {
    pub fn new(files: Arc<dyn FileAccess>, db: SharedDb, debounce: Duration) -> Self {
        Self {
            files,
            db,
            debounce,
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Let the file access layer choose the file for `link`.
    pub async fn pick(&self, file_name: &str) -> AppResult<FileHandle> {
        self.files.pick_file(file_name).await
    }

    pub async fn link(&self, link: &str, handle: &FileHandle) -> AppResult<()> {
        self.db.lock().await.set_link(link, handle)?;
        info!(link, file = %handle.name, "file linked");
        Ok(())
    }

    pub async fn unlink(&self, link: &str) -> AppResult<bool> {
        self.db.lock().await.remove_link(link)
    }

    pub async fn linked(&self, link: &str) -> AppResult<Option<FileHandle>> {
        self.db.lock().await.get_link(link)
    }

    async fn read_tasks(&self, handle: &FileHandle) -> Option<Vec<Task>> {
        match self.files.read_file(handle).await {
            Ok(text) => Some(parse_todo_txt(&text)),
            Err(e) => {
                warn!(file = %handle.name, error = %e, "could not read linked file");
                None
            }
        }
    }

    /// Merge the linked files into `app_tasks`.
    ///
    /// Returns `None` when no sync happened: nothing is linked, or the todo
    /// file is not linked and the done file yielded no tasks. `Some` with the
    /// merged tasks otherwise, even if the files were empty.
    pub async fn sync_inbound(&self, app_tasks: &[Task]) -> Option<Vec<Task>> {
        let todo = usable_handle(self.files.as_ref(), &self.db, TODO_LINK).await;
        let done = usable_handle(self.files.as_ref(), &self.db, DONE_LINK).await;
        if todo.is_none() && done.is_none() {
            return None;
        }

        let mut parsed = Vec::new();
        if let Some(handle) = &todo
            && let Some(tasks) = self.read_tasks(handle).await
        {
            parsed.extend(tasks);
        }
        if let Some(handle) = &done
            && let Some(tasks) = self.read_tasks(handle).await
        {
            parsed.extend(tasks.into_iter().map(|t| Task {
                complete: true,
                ..t
            }));
        }

        if todo.is_none() && parsed.is_empty() {
            return None;
        }

        debug!(parsed = parsed.len(), "inbound sync");
        Some(merge_tasks(app_tasks, &parsed, Local::now()))
    }

    /// Schedule a write of `tasks` to the linked files, replacing any write
    /// still waiting for its debounce delay.
    ///
    /// Must be called from within a tokio runtime.
    pub fn sync_outbound(&self, tasks: Vec<Task>) {
        let files = Arc::clone(&self.files);
        let db = Arc::clone(&self.db);
        let delay = self.debounce;

        let mut pending = self.pending();
        if let Some(previous) = pending.take() {
            previous.abort();
            debug!("pending outbound sync replaced");
        }

        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            write_linked(files.as_ref(), &db, &tasks).await;
        }));
    }

    /// Wait for the pending outbound write, if any.
    pub async fn flush(&self) {
        let handle = self.pending().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
            && !e.is_cancelled()
        {
            warn!(error = %e, "outbound sync task failed");
        }
    }
}
