//! `~` expansion for paths read from the configuration file.

use std::path::{Path, PathBuf};

/// Replace a leading `~` component with the home directory.
///
/// Other paths, and every path when no home directory is known, come back
/// unchanged.
pub fn expand_tilde(path: &str) -> PathBuf {
    let raw = Path::new(path);
    match (raw.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => raw.to_path_buf(),
    }
}
