//! File-based state store — one small text file per key.
//!
//! Storage location: `~/.graphhook/state/<key>.txt`
//!
//! The files are human-inspectable and trivially editable, which matters when
//! a capture interval needs to be reset by hand. Values are trimmed on read.

use async_trait::async_trait;
use graphhook_core::error::StateError;
use graphhook_core::state::StateStore;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A directory-backed state store.
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(dir = %dir.display(), "File state store opened");
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StateError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StateError::Storage(format!("Invalid state key: {key:?}")));
        }
        Ok(self.dir.join(format!("{key}.txt")))
    }
}

#[async_trait]
impl StateStore for FileStateStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content.trim().to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StateError::Storage(format!(
                "Failed to read {}: {e}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            StateError::Storage(format!("Failed to create state directory: {e}"))
        })?;
        tokio::fs::write(&path, value).await.map_err(|e| {
            StateError::Storage(format!("Failed to write {}: {e}", path.display()))
        })?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StateError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StateError::Storage(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }
}
