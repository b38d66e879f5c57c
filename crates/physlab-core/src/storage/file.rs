//! File-based storage implementation.

use super::{Storage, StorageError, StorageResult, is_sav};
use crate::config::LabConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// File-based storage.
///
/// Save files live directly in `base_path`. Writes go to a temporary sibling
/// and are renamed into place so a crash never leaves a half-written save.
pub struct FileStorage {
    /// Base directory for save files.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new file storage with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                StorageError::Io(format!("Failed to create storage directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create file storage in the configured location.
    ///
    /// See [`LabConfig::from_env`] for how the directory is chosen.
    pub fn default_location() -> StorageResult<Self> {
        Self::new(LabConfig::from_env().root_dir)
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl Storage for FileStorage {
    fn root(&self) -> &Path {
        &self.base_path
    }

    fn list(&self) -> StorageResult<Vec<PathBuf>> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let entries = fs::read_dir(&self.base_path)
            .map_err(|e| StorageError::Io(format!("Failed to read directory: {}", e)))?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && is_sav(path))
            .collect();
        paths.sort();
        Ok(paths)
    }

    fn read(&self, path: &Path) -> StorageResult<String> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        fs::read_to_string(path)
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {}", path.display(), e)))
    }

    fn write(&self, path: &Path, contents: &str) -> StorageResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                StorageError::Io(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let temp = temp_sibling(path);
        fs::write(&temp, contents)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {}", temp.display(), e)))?;
        fs::rename(&temp, path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            StorageError::Io(format!("Failed to replace {}: {}", path.display(), e))
        })
    }

    fn remove(&self, path: &Path) -> StorageResult<()> {
        if !path.exists() {
            return Err(StorageError::NotFound(path.display().to_string()));
        }
        fs::remove_file(path)
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {}", path.display(), e)))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
