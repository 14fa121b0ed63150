//! Task/entry record operations.
//!
//! Inserts fail with `AppError::Constraint` on a duplicate logical key; the
//! `upsert_*` helpers implement the add-then-update pattern on top of that.

use crate::db::cursor::{DEFAULT_BATCH, RecordCursor};
use crate::db::log::ttlog;
use crate::db::models::{ENTRY_COLUMNS, Record, TASK_COLUMNS, completed_date_str};
use crate::db::pool::TimesheetDb;
use crate::errors::{AppError, AppResult};
use crate::models::{Entry, Task};
use crate::sync::files::FileHandle;
use crate::utils::date::{start_of_day, start_of_today, to_millis};
use crate::utils::ids::fresh_id;
use chrono::{DateTime, Days, Local, NaiveDate};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::PathBuf;

/// Default number of historical tasks offered for autocomplete.
pub const RECENT_TASKS_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Keep the caller's `last_modified` even when content changed.
    pub preserve_timestamp: bool,
}

impl UpdateOptions {
    pub fn preserving_timestamp() -> Self {
        Self {
            preserve_timestamp: true,
        }
    }
}

fn max_id(conn: &Connection, table: &str) -> AppResult<Option<i64>> {
    let sql = format!("SELECT MAX(id) FROM {table}");
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Two entry records for the same task starting at the same millisecond.
fn same_interval(a: &Entry, b: &Entry) -> bool {
    a.task == b.task && a.start.timestamp_millis() == b.start.timestamp_millis()
}

/// Epoch-millisecond range `[start of day, start of next day)`.
fn day_bounds(day: NaiveDate) -> (i64, i64) {
    let next = day.checked_add_days(Days::new(1)).unwrap_or(day);
    (
        to_millis(&start_of_day(day)),
        to_millis(&start_of_day(next)),
    )
}

pub(crate) fn insert_task(conn: &Connection, task: &Task) -> AppResult<()> {
    conn.execute(
        "INSERT INTO tasks (id, exid, description, project, client, complete, completed_date,
                            deleted, last_modified, most_recent_entry, total, timing_state, synced)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            task.id,
            task.exid,
            task.description,
            task.project,
            task.client,
            task.complete,
            completed_date_str(task),
            task.deleted,
            to_millis(&task.last_modified),
            to_millis(&task.most_recent_entry),
            task.total,
            task.timing_state.to_db_str(),
            task.synced,
        ],
    )
    .map_err(|e| AppError::from_insert(e, "tasks", &task.exid))?;
    Ok(())
}

pub(crate) fn insert_entry(conn: &Connection, entry: &Entry) -> AppResult<()> {
    conn.execute(
        "INSERT INTO entries (id, task, annotation, started_at, ended_at, synced, deleted, last_modified)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id,
            entry.task,
            entry.annotation,
            to_millis(&entry.start),
            entry.end.as_ref().map(to_millis),
            entry.synced,
            entry.deleted,
            to_millis(&entry.last_modified),
        ],
    )
    .map_err(|e| AppError::from_insert(e, "entries", &entry.id.to_string()))?;
    Ok(())
}

fn write_task(conn: &Connection, task: &Task) -> AppResult<()> {
    conn.execute(
        "UPDATE tasks
         SET exid = ?1, description = ?2, project = ?3, client = ?4,
             complete = ?5, completed_date = ?6, deleted = ?7,
             last_modified = ?8, most_recent_entry = ?9, total = ?10,
             timing_state = ?11, synced = ?12
         WHERE id = ?13",
        params![
            task.exid,
            task.description,
            task.project,
            task.client,
            task.complete,
            completed_date_str(task),
            task.deleted,
            to_millis(&task.last_modified),
            to_millis(&task.most_recent_entry),
            task.total,
            task.timing_state.to_db_str(),
            task.synced,
            task.id,
        ],
    )
    .map_err(|e| AppError::from_insert(e, "tasks", &task.exid))?;
    Ok(())
}

fn write_entry(conn: &Connection, entry: &Entry) -> AppResult<()> {
    conn.execute(
        "UPDATE entries
         SET task = ?1, annotation = ?2, started_at = ?3, ended_at = ?4,
             synced = ?5, deleted = ?6, last_modified = ?7
         WHERE id = ?8",
        params![
            entry.task,
            entry.annotation,
            to_millis(&entry.start),
            entry.end.as_ref().map(to_millis),
            entry.synced,
            entry.deleted,
            to_millis(&entry.last_modified),
            entry.id,
        ],
    )?;
    Ok(())
}

impl TimesheetDb {
    // ---------------------------
    // Tasks
    // ---------------------------

    /// Insert a new task, assigning `id` and `exid` from the current time
    /// when absent. Returns the stored record.
    pub fn add_task(&self, task: &Task) -> AppResult<Task> {
        let now = Local::now();
        let mut record = task.clone();

        let id_owner: Option<String> = if record.id == 0 {
            None
        } else {
            self.conn
                .query_row("SELECT exid FROM tasks WHERE id = ?1", [record.id], |row| {
                    row.get(0)
                })
                .optional()?
        };
        let id_taken_by_other = id_owner.is_some_and(|owner| owner != record.exid);

        if record.id == 0 || id_taken_by_other {
            record.id = fresh_id(&now, max_id(&self.conn, "tasks")?);
        }
        if !record.has_exid() {
            record.exid = record.id.to_string();
        }

        insert_task(&self.conn, &record)?;
        Ok(record)
    }

    /// Stored task for `exid`, preferring the live record over deleted ones.
    pub fn get_task(&self, exid: &str) -> AppResult<Option<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE exid = ?1 ORDER BY deleted ASC, id DESC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(&sql, [exid], Task::from_row)
            .optional()?)
    }

    /// The stored record `task` refers to: the one with the same id and
    /// exid if present, otherwise the record [`TimesheetDb::get_task`] picks.
    fn find_stored_task(&self, task: &Task) -> AppResult<Option<Task>> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND exid = ?2");
        let same_record = self
            .conn
            .query_row(&sql, params![task.id, task.exid], Task::from_row)
            .optional()?;
        match same_record {
            Some(t) => Ok(Some(t)),
            None => self.get_task(&task.exid),
        }
    }

    /// Overwrite the stored task matched by `exid`.
    ///
    /// Writing back unchanged content leaves the stored record (and its
    /// `last_modified`) untouched. Changed content gets `last_modified = now`
    /// unless `opts.preserve_timestamp` is set.
    pub fn update_task(&self, task: &Task, opts: UpdateOptions) -> AppResult<Task> {
        let existing = self
            .find_stored_task(task)?
            .ok_or_else(|| AppError::NotFound {
                store: "tasks",
                key: task.exid.clone(),
            })?;

        let mut record = task.clone();
        record.id = existing.id;

        if record.same_content(&existing) {
            return Ok(existing);
        }
        if !opts.preserve_timestamp {
            record.last_modified = Local::now();
        }

        write_task(&self.conn, &record)?;
        Ok(record)
    }

    /// Add, falling back to update when the key already exists.
    pub fn upsert_task(&self, task: &Task, opts: UpdateOptions) -> AppResult<Task> {
        match self.add_task(task) {
            Err(e) if e.is_constraint() => self.update_task(task, opts),
            other => other,
        }
    }

    /// Every task, deleted ones included.
    pub fn get_all_tasks(&self) -> AppResult<Vec<Task>> {
        self.tasks_cursor(DEFAULT_BATCH).collect()
    }

    pub fn tasks_cursor(&self, batch: usize) -> RecordCursor<'_, Task> {
        RecordCursor::new(&self.conn, batch)
    }

    /// Historical tasks for autocomplete: non-deleted, last modified before
    /// the start of today, most recent first.
    pub fn get_recent_tasks(&self, limit: usize) -> AppResult<Vec<Task>> {
        self.get_recent_tasks_before(limit, start_of_today())
    }

    pub fn get_recent_tasks_before(
        &self,
        limit: usize,
        cutoff: DateTime<Local>,
    ) -> AppResult<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE deleted = 0 AND last_modified < ?1
             ORDER BY last_modified DESC
             LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![to_millis(&cutoff), limit as i64], Task::from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Live tasks belonging to `day`: modified on it, with an entry started
    /// on it, or currently timing.
    pub fn tasks_on_day(&self, day: NaiveDate) -> AppResult<Vec<Task>> {
        let (from, to) = day_bounds(day);
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE deleted = 0
               AND ((last_modified >= ?1 AND last_modified < ?2)
                 OR (most_recent_entry >= ?1 AND most_recent_entry < ?2)
                 OR timing_state = 'start')
             ORDER BY most_recent_entry DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![from, to], Task::from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// One page of live tasks whose description, client or exid contains
    /// `search` (case-insensitive), plus the total number of matches.
    ///
    /// `page_size == 0` returns every match on page 0.
    pub fn search_tasks(
        &self,
        search: Option<&str>,
        page: usize,
        page_size: usize,
    ) -> AppResult<(Vec<Task>, usize)> {
        let needle = search.map(str::to_lowercase);
        let matches = |task: &Task| match &needle {
            None => true,
            Some(n) => {
                task.description.to_lowercase().contains(n)
                    || task.exid.to_lowercase().contains(n)
                    || task.client_name().is_some_and(|c| c.to_lowercase().contains(n))
            }
        };

        let (skip, take) = if page_size == 0 {
            (0, usize::MAX)
        } else {
            (page.saturating_mul(page_size), page_size)
        };

        let mut total = 0;
        let mut out = Vec::new();
        for task in self.tasks_cursor(DEFAULT_BATCH) {
            let task = task?;
            if task.deleted || !matches(&task) {
                continue;
            }
            if total >= skip && out.len() < take {
                out.push(task);
            }
            total += 1;
        }
        Ok((out, total))
    }

    /// Hard removal of every record with `exid`. Maintenance paths only.
    pub fn permanently_delete_task(&self, exid: &str) -> AppResult<usize> {
        let removed = self.conn.execute("DELETE FROM tasks WHERE exid = ?1", [exid])?;
        ttlog(
            &self.conn,
            "permanent_delete",
            exid,
            &format!("Removed {removed} task record(s)"),
        )?;
        Ok(removed)
    }

    // ---------------------------
    // Entries
    // ---------------------------

    /// Insert a new entry, assigning `id` from the current time when absent
    /// or when the id already belongs to a different entry.
    pub fn add_entry(&self, entry: &Entry) -> AppResult<Entry> {
        let mut record = entry.clone();
        record.gap = None;

        let id_taken_by_other = record.id != 0
            && self
                .get_entry(record.id)?
                .is_some_and(|stored| !same_interval(&stored, &record));

        if record.id == 0 || id_taken_by_other {
            record.id = fresh_id(&Local::now(), max_id(&self.conn, "entries")?);
        }
        insert_entry(&self.conn, &record)?;
        Ok(record)
    }

    /// The stored row `entry` stands for: the one under its id when it
    /// records the same interval, otherwise one with the same task and start.
    fn find_stored_entry(&self, entry: &Entry) -> AppResult<Option<Entry>> {
        if let Some(stored) = self.get_entry(entry.id)? {
            if same_interval(&stored, entry) {
                return Ok(Some(stored));
            }
        }

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE task = ?1 AND started_at = ?2
             ORDER BY id ASC LIMIT 1"
        );
        Ok(self
            .conn
            .query_row(
                &sql,
                params![entry.task, to_millis(&entry.start)],
                Entry::from_row,
            )
            .optional()?)
    }

    pub fn get_entry(&self, id: i64) -> AppResult<Option<Entry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1");
        Ok(self
            .conn
            .query_row(&sql, [id], Entry::from_row)
            .optional()?)
    }

    /// Overwrite the stored entry with the same `id`; same timestamp rules
    /// as [`TimesheetDb::update_task`].
    pub fn update_entry(&self, entry: &Entry, opts: UpdateOptions) -> AppResult<Entry> {
        let existing = self.get_entry(entry.id)?.ok_or_else(|| AppError::NotFound {
            store: "entries",
            key: entry.id.to_string(),
        })?;

        if entry.same_content(&existing) {
            return Ok(existing);
        }

        let mut record = entry.clone();
        record.gap = None;
        if !opts.preserve_timestamp {
            record.last_modified = Local::now();
        }

        write_entry(&self.conn, &record)?;
        Ok(record)
    }

    /// Update the stored row for the same interval, or insert a new one.
    /// An id held by an unrelated entry is never overwritten.
    pub fn upsert_entry(&self, entry: &Entry, opts: UpdateOptions) -> AppResult<Entry> {
        match self.find_stored_entry(entry)? {
            Some(stored) => {
                let record = Entry {
                    id: stored.id,
                    ..entry.clone()
                };
                self.update_entry(&record, opts)
            }
            None => self.add_entry(entry),
        }
    }

    /// Every entry, deleted ones included.
    pub fn get_all_entries(&self) -> AppResult<Vec<Entry>> {
        self.entries_cursor(DEFAULT_BATCH).collect()
    }

    pub fn entries_cursor(&self, batch: usize) -> RecordCursor<'_, Entry> {
        RecordCursor::new(&self.conn, batch)
    }

    /// Entries referencing `exid`, in chronological order.
    pub fn entries_for_task(&self, exid: &str) -> AppResult<Vec<Entry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE task = ?1 ORDER BY started_at ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([exid], Entry::from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Live entries started on `day`, in chronological order.
    pub fn entries_on_day(&self, day: NaiveDate) -> AppResult<Vec<Entry>> {
        let (from, to) = day_bounds(day);
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries
             WHERE deleted = 0 AND started_at >= ?1 AND started_at < ?2
             ORDER BY started_at ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![from, to], Entry::from_row)?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    /// Hard removal of one entry. Maintenance paths only.
    pub fn permanently_delete_entry(&self, id: i64) -> AppResult<usize> {
        let removed = self.conn.execute("DELETE FROM entries WHERE id = ?1", [id])?;
        ttlog(
            &self.conn,
            "permanent_delete",
            &id.to_string(),
            &format!("Removed {removed} entry record(s)"),
        )?;
        Ok(removed)
    }

    // ---------------------------
    // Linked files
    // ---------------------------

    pub fn get_link(&self, link_id: &str) -> AppResult<Option<FileHandle>> {
        let handle = self
            .conn
            .query_row(
                "SELECT path, name FROM file_handles WHERE link_id = ?1",
                [link_id],
                |row| {
                    Ok(FileHandle {
                        path: PathBuf::from(row.get::<_, String>(0)?),
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(handle)
    }

    pub fn set_link(&self, link_id: &str, handle: &FileHandle) -> AppResult<()> {
        self.conn.execute(
            "INSERT INTO file_handles (link_id, path, name, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(link_id) DO UPDATE SET
                path = excluded.path, name = excluded.name, updated_at = excluded.updated_at",
            params![
                link_id,
                handle.path.to_string_lossy().to_string(),
                handle.name,
                Local::now().to_rfc3339(),
            ],
        )?;
        ttlog(&self.conn, "link", link_id, &handle.path.to_string_lossy())?;
        Ok(())
    }

    pub fn remove_link(&self, link_id: &str) -> AppResult<bool> {
        let removed = self
            .conn
            .execute("DELETE FROM file_handles WHERE link_id = ?1", [link_id])?;
        if removed > 0 {
            ttlog(&self.conn, "unlink", link_id, "Link removed")?;
        }
        Ok(removed > 0)
    }
}
