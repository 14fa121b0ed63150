pub mod entry;
pub mod settings;
pub mod state;
pub mod task;
pub mod timestamp;
pub mod timing_state;

pub use entry::{Entry, NewEntry};
pub use settings::Settings;
pub use state::{AppState, Archive, DailyStats, PartialState};
pub use task::Task;
pub use timing_state::TimingState;
