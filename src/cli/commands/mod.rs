pub mod config;
pub mod db;
pub mod entry;
pub mod init;
pub mod link;
pub mod list;
pub mod log;
pub mod purge;
pub mod settings;
pub mod task;
