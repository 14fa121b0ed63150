//! File access capability used by todo.txt sync.
//!
//! The sync engine only depends on the [`FileAccess`] trait. [`FsFileAccess`]
//! works on the local filesystem; [`MemoryFiles`] keeps files in memory and
//! lets callers revoke permissions, which is what the tests use.

use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// A remembered reference to a linked file and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub path: PathBuf,
    pub name: String,
}

impl FileHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self { path, name }
    }
}

#[async_trait]
pub trait FileAccess: Send + Sync {
    /// Choose a file for `description` (e.g. `"todo.txt"`).
    async fn pick_file(&self, description: &str) -> AppResult<FileHandle>;
    async fn read_file(&self, handle: &FileHandle) -> AppResult<String>;
    async fn write_file(&self, handle: &FileHandle, text: &str) -> AppResult<()>;
    /// `false` means the file must be treated as unlinked for this operation.
    async fn verify_permission(&self, handle: &FileHandle) -> bool;
}

/// Filesystem-backed access. `pick_file` resolves names inside `root`.
#[derive(Debug, Clone)]
pub struct FsFileAccess {
    root: PathBuf,
}

impl FsFileAccess {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl FileAccess for FsFileAccess {
    async fn pick_file(&self, description: &str) -> AppResult<FileHandle> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(description);
        if tokio::fs::metadata(&path).await.is_err() {
            tokio::fs::write(&path, "").await?;
            debug!(path = %path.display(), "created empty file for link");
        }
        Ok(FileHandle::new(path))
    }

    async fn read_file(&self, handle: &FileHandle) -> AppResult<String> {
        Ok(tokio::fs::read_to_string(&handle.path).await?)
    }

    async fn write_file(&self, handle: &FileHandle, text: &str) -> AppResult<()> {
        tokio::fs::write(&handle.path, text).await?;
        Ok(())
    }

    async fn verify_permission(&self, handle: &FileHandle) -> bool {
        match tokio::fs::metadata(&handle.path).await {
            Ok(meta) => !meta.permissions().readonly(),
            Err(_) => match handle.path.parent() {
                Some(parent) => tokio::fs::metadata(parent)
                    .await
                    .map(|m| m.is_dir() && !m.permissions().readonly())
                    .unwrap_or(false),
                None => false,
            },
        }
    }
}

/// In-memory files with revocable permissions.
#[derive(Debug, Default)]
pub struct MemoryFiles {
    files: Mutex<HashMap<PathBuf, String>>,
    denied: Mutex<HashSet<PathBuf>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MemoryFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, path: impl Into<PathBuf>, text: &str) {
        guard(&self.files).insert(path.into(), text.to_string());
    }

    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        guard(&self.files).get(path.as_ref()).cloned()
    }

    pub fn revoke(&self, path: impl Into<PathBuf>) {
        guard(&self.denied).insert(path.into());
    }

    pub fn grant(&self, path: impl AsRef<Path>) {
        guard(&self.denied).remove(path.as_ref());
    }
}

#[async_trait]
impl FileAccess for MemoryFiles {
    async fn pick_file(&self, description: &str) -> AppResult<FileHandle> {
        let path = PathBuf::from(description);
        guard(&self.files).entry(path.clone()).or_default();
        Ok(FileHandle::new(path))
    }

    async fn read_file(&self, handle: &FileHandle) -> AppResult<String> {
        if guard(&self.denied).contains(&handle.path) {
            return Err(AppError::Permission(handle.name.clone()));
        }
        guard(&self.files).get(&handle.path).cloned().ok_or_else(|| {
            AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such file: {}", handle.path.display()),
            ))
        })
    }

    async fn write_file(&self, handle: &FileHandle, text: &str) -> AppResult<()> {
        if guard(&self.denied).contains(&handle.path) {
            return Err(AppError::Permission(handle.name.clone()));
        }
        guard(&self.files).insert(handle.path.clone(), text.to_string());
        Ok(())
    }

    async fn verify_permission(&self, handle: &FileHandle) -> bool {
        !guard(&self.denied).contains(&handle.path)
    }
}
