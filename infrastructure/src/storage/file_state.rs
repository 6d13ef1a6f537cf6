//! File-backed state storage.
//!
//! Persists the session state blob to a single file. Saves go through a
//! sibling temp file followed by a rename, so a crash mid-write leaves
//! either the previous blob or the new one on disk, never a torn write.

use scribe_application::{StateStorage, StorageError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// State storage backed by one file on the local filesystem.
pub struct FileStateStorage {
    path: PathBuf,
}

impl FileStateStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this storage reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateStorage for FileStateStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Load(e.to_string())),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| StorageError::Save(e.to_string()))?;
            }
        }

        let temp = self.temp_path();
        fs::write(&temp, bytes).map_err(|e| StorageError::Save(e.to_string()))?;
        fs::rename(&temp, &self.path).map_err(|e| StorageError::Save(e.to_string()))?;
        Ok(())
    }
}
