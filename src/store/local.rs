//! Local storage adapter: settings and the lightweight session state.

use crate::db::migrate::{BACKUP_KEY, LEGACY_KEY};
use crate::errors::AppResult;
use crate::models::state::STATE_VERSION;
use crate::models::{AppState, DailyStats, NewEntry, PartialState, Settings};
use crate::store::storage::KeyValueStorage;
use crate::store::{ReadQuery, StateAdapter};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// What the local adapter persists under [`LEGACY_KEY`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocalBlob {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    new_entry: Option<NewEntry>,
    #[serde(default)]
    current_task: Option<String>,
    #[serde(default)]
    clients: Vec<String>,
    #[serde(default)]
    stats: DailyStats,
    #[serde(default)]
    version: u32,
}

pub struct LocalAdapter {
    storage: Arc<KeyValueStorage>,
}

impl LocalAdapter {
    pub fn new(storage: Arc<KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Bring an older blob up to the current shape.
    ///
    /// The original blob is kept under [`BACKUP_KEY`] (unless a backup
    /// already exists); the rewritten blob drops the archive and entries,
    /// which now live in the database.
    fn migrate(&self, raw: &str, mut blob: Value) -> AppResult<Value> {
        let version = blob.get("version").and_then(Value::as_u64).unwrap_or(0);
        if version >= u64::from(STATE_VERSION) {
            return Ok(blob);
        }

        if self.storage.get_item(BACKUP_KEY).is_none() {
            self.storage.set_item(BACKUP_KEY, raw)?;
            info!(from = version, "state blob backed up before migration");
        }

        if let Some(obj) = blob.as_object_mut() {
            obj.remove("archive");
            obj.remove("entries");
            obj.insert("version".to_string(), Value::from(STATE_VERSION));
        }
        self.storage
            .set_item(LEGACY_KEY, &serde_json::to_string(&blob)?)?;
        info!(from = version, to = STATE_VERSION, "state blob migrated");
        Ok(blob)
    }

    fn load(&self) -> AppResult<Option<LocalBlob>> {
        let Some(raw) = self.storage.get_item(LEGACY_KEY) else {
            return Ok(None);
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "malformed local state, starting empty");
                return Ok(None);
            }
        };

        let value = self.migrate(&raw, value)?;
        match serde_json::from_value::<LocalBlob>(value) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) => {
                warn!(error = %e, "unreadable local state, starting empty");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl StateAdapter for LocalAdapter {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn read(&self, _query: &ReadQuery) -> AppResult<PartialState> {
        let Some(blob) = self.load()? else {
            return Ok(PartialState::default());
        };

        Ok(PartialState {
            settings: Some(blob.settings),
            new_entry: Some(blob.new_entry),
            current_task: Some(blob.current_task),
            clients: Some(blob.clients),
            stats: Some(blob.stats),
            version: Some(blob.version),
            ..PartialState::default()
        })
    }

    async fn write(&self, state: &AppState) -> AppResult<()> {
        let blob = LocalBlob {
            settings: state.settings.clone(),
            new_entry: state.new_entry.clone(),
            current_task: state.current_task.clone(),
            clients: state.clients.clone(),
            stats: state.stats.clone(),
            version: STATE_VERSION,
        };
        self.storage
            .set_item(LEGACY_KEY, &serde_json::to_string(&blob)?)
    }
}
