pub mod cursor;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod models;
pub mod pool;
pub mod queries;
pub mod stats;

pub use pool::{SharedDb, TimesheetDb};
pub use queries::{RECENT_TASKS_LIMIT, UpdateOptions};
