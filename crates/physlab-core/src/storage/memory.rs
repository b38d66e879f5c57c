//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult, is_sav};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
pub struct MemoryStorage {
    root: PathBuf,
    files: RwLock<HashMap<PathBuf, String>>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    /// Create a new empty memory storage rooted at a virtual directory.
    pub fn new() -> Self {
        Self::with_root("memory")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            files: RwLock::new(HashMap::new()),
        }
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn root(&self) -> &Path {
        &self.root
    }

    fn list(&self) -> StorageResult<Vec<PathBuf>> {
        let files = self.files.read().map_err(lock_error)?;
        let mut paths: Vec<PathBuf> = files
            .keys()
            .filter(|path| path.parent() == Some(self.root.as_path()) && is_sav(path))
            .cloned()
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn read(&self, path: &Path) -> StorageResult<String> {
        let files = self.files.read().map_err(lock_error)?;
        files
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(path.display().to_string()))
    }

    fn write(&self, path: &Path, contents: &str) -> StorageResult<()> {
        let mut files = self.files.write().map_err(lock_error)?;
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        let mut files = self.files.write().map_err(lock_error)?;
        files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| StorageError::NotFound(path.display().to_string()))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files
            .read()
            .map(|files| files.contains_key(path))
            .unwrap_or(false)
    }
}
