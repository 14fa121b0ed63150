/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Color for a task's timing column: green while timing, grey otherwise.
pub fn color_for_timing(running: bool) -> &'static str {
    if running { GREEN } else { GREY }
}

/// Sync flag color: unsynced work is highlighted.
pub fn color_for_synced(synced: bool) -> &'static str {
    if synced { GREY } else { YELLOW }
}

/// Grey out empty cells ("" or "--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}--{RESET}")
    } else {
        value.to_string()
    }
}
