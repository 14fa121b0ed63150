//! Multi-adapter persistence.
//!
//! Each adapter owns a strict subset of the application state. Reads run
//! adapter by adapter and shallow-merge their partial states; writes fan out
//! to every adapter at once. A failing adapter never aborts the others.

pub mod archive;
pub mod local;
pub mod session;
pub mod storage;

pub use archive::ArchiveAdapter;
pub use local::LocalAdapter;
pub use session::SessionAdapter;
pub use storage::KeyValueStorage;

use crate::errors::{AppError, AppResult};
use crate::models::{AppState, PartialState};
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, warn};

/// Parameters for paginated, filtered archive reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    /// Case-insensitive substring matched against description, client and exid.
    pub search: Option<String>,
    /// Zero-based page index.
    pub page: usize,
    /// Tasks per page; `0` puts everything on one page.
    pub page_size: usize,
}

impl Default for ReadQuery {
    fn default() -> Self {
        Self {
            search: None,
            page: 0,
            page_size: 20,
        }
    }
}

impl ReadQuery {
    pub fn with_search(mut self, search: &str) -> Self {
        let search = search.trim();
        self.search = (!search.is_empty()).then(|| search.to_string());
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }
}

#[async_trait]
pub trait StateAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// The part of the state this adapter owns; other fields stay `None`.
    async fn read(&self, query: &ReadQuery) -> AppResult<PartialState>;

    /// Persist the part of `state` this adapter owns.
    async fn write(&self, state: &AppState) -> AppResult<()>;
}

/// Merged result of [`Store::read`].
#[derive(Debug, Default)]
pub struct StoreRead {
    pub state: PartialState,
    /// Failures of individual adapters, each wrapped in `AppError::Adapter`.
    pub errors: Vec<AppError>,
}

pub struct Store {
    adapters: Vec<Box<dyn StateAdapter>>,
}

impl Store {
    pub fn new(adapters: Vec<Box<dyn StateAdapter>>) -> Self {
        Self { adapters }
    }

    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Read every adapter in order; later adapters overwrite earlier ones.
    pub async fn read(&self, query: &ReadQuery) -> StoreRead {
        let mut result = StoreRead::default();

        for adapter in &self.adapters {
            match adapter.read(query).await {
                Ok(partial) => result.state.merge(partial),
                Err(e) => {
                    warn!(adapter = adapter.name(), error = %e, "adapter read failed");
                    result.errors.push(e.in_adapter(adapter.name()));
                }
            }
        }

        debug!(errors = result.errors.len(), "store read complete");
        result
    }

    /// Write to all adapters concurrently. Returns the number that failed.
    pub async fn write(&self, state: &AppState) -> usize {
        let results = join_all(self.adapters.iter().map(|a| a.write(state))).await;

        let mut failed = 0;
        for (adapter, result) in self.adapters.iter().zip(results) {
            if let Err(e) = result {
                warn!(adapter = adapter.name(), error = %e, "adapter write failed");
                failed += 1;
            }
        }
        failed
    }
}
