pub mod engine;
pub mod files;
pub mod merge;
pub mod todo_txt;

pub use engine::{DONE_LINK, LINKS, SyncEngine, TODO_LINK};
pub use files::{FileAccess, FileHandle, FsFileAccess, MemoryFiles};
