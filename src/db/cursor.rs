//! Batched, pull-based iteration over a table.
//!
//! Records are fetched `batch` at a time using keyset pagination on the
//! primary key, so the consumer drives the pace and can stop at any point:
//! dropping the cursor early simply stops fetching.

use crate::db::models::Record;
use crate::errors::AppResult;
use rusqlite::Connection;
use std::collections::VecDeque;

pub const DEFAULT_BATCH: usize = 200;

pub struct RecordCursor<'c, R: Record> {
    conn: &'c Connection,
    batch: usize,
    after: Option<i64>,
    buffer: VecDeque<R>,
    exhausted: bool,
}

impl<'c, R: Record> RecordCursor<'c, R> {
    pub fn new(conn: &'c Connection, batch: usize) -> Self {
        Self {
            conn,
            batch: batch.max(1),
            after: None,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_batch(&mut self) -> AppResult<()> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id > ?1 ORDER BY id ASC LIMIT ?2",
            R::COLUMNS,
            R::TABLE
        );
        let conn = self.conn;
        let mut stmt = conn.prepare_cached(&sql)?;
        let after = self.after.unwrap_or(i64::MIN);
        let rows = stmt.query_map(rusqlite::params![after, self.batch as i64], R::from_row)?;

        let mut fetched = 0;
        for r in rows {
            let record = r?;
            self.after = Some(record.key());
            self.buffer.push_back(record);
            fetched += 1;
        }

        if fetched < self.batch {
            self.exhausted = true;
        }
        Ok(())
    }
}

impl<R: Record> Iterator for RecordCursor<'_, R> {
    type Item = AppResult<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_batch() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
