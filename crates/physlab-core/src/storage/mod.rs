//! Storage abstraction for save files.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for save file backends.
///
/// Paths handed to a backend are full paths; `root` is the directory that
/// `list` scans and new experiments are created in.
pub trait Storage: Send + Sync {
    /// Directory holding the save files.
    fn root(&self) -> &Path;

    /// List every `.sav` file directly under the root.
    fn list(&self) -> StorageResult<Vec<PathBuf>>;

    /// Read a file as text.
    fn read(&self, path: &Path) -> StorageResult<String>;

    /// Write a file, replacing any previous content.
    fn write(&self, path: &Path, contents: &str) -> StorageResult<()>;

    /// Remove a file. Fails with `NotFound` if it does not exist.
    fn remove(&self, path: &Path) -> StorageResult<()>;

    /// Check if a file exists.
    fn exists(&self, path: &Path) -> bool;
}

fn is_sav(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == crate::format::SAV_EXTENSION)
        .unwrap_or(false)
}
