//! Session storage adapter: soft-deletion markers for the current process.

use crate::errors::AppResult;
use crate::models::{AppState, PartialState, Task};
use crate::store::storage::KeyValueStorage;
use crate::store::{ReadQuery, StateAdapter};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

const DELETED_TASKS_KEY: &str = "deletedTasks";

pub struct SessionAdapter {
    storage: Arc<KeyValueStorage>,
}

impl SessionAdapter {
    pub fn new(storage: Arc<KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// A session adapter over fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(KeyValueStorage::in_memory()))
    }
}

#[async_trait]
impl StateAdapter for SessionAdapter {
    fn name(&self) -> &'static str {
        "session"
    }

    async fn read(&self, _query: &ReadQuery) -> AppResult<PartialState> {
        let deleted = match self.storage.get_item(DELETED_TASKS_KEY) {
            Some(raw) => serde_json::from_str::<Vec<Task>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "malformed deletion markers, ignoring");
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(PartialState {
            deleted_tasks: Some(deleted),
            ..PartialState::default()
        })
    }

    async fn write(&self, state: &AppState) -> AppResult<()> {
        self.storage.set_item(
            DELETED_TASKS_KEY,
            &serde_json::to_string(&state.deleted_tasks)?,
        )
    }
}
