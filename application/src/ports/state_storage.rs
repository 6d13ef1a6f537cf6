//! Port for durable local state.
//!
//! The [`SessionStore`](crate::store::session_store::SessionStore) persists
//! its whole state as an opaque byte blob through this port. Keeping the
//! capability this narrow (load bytes, save bytes) makes the store testable
//! with an in-memory fake and portable to any durable backing store without
//! touching orchestration logic.

use std::sync::Mutex;
use thiserror::Error;

/// Errors that can occur in a storage adapter.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load persisted state: {0}")]
    Load(String),

    #[error("Failed to save persisted state: {0}")]
    Save(String),

    #[error("Persisted state is corrupt: {0}")]
    Corrupt(String),
}

/// Durable key-less storage for the session state blob.
///
/// `save` must be atomic: after a crash, `load` returns either the previous
/// blob or the new one, never a torn write. Both calls are synchronous:
/// persistence completes before any in-memory state transition.
pub trait StateStorage: Send + Sync {
    /// Load the persisted blob, or `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the persisted blob as a unit.
    fn save(&self, bytes: &[u8]) -> Result<(), StorageError>;
}

/// In-memory implementation for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemoryStateStorage {
    blob: Mutex<Option<Vec<u8>>>,
}

impl InMemoryStateStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStorage for InMemoryStateStorage {
    fn load(&self) -> Result<Option<Vec<u8>>, StorageError> {
        let blob = self
            .blob
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(blob.clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<(), StorageError> {
        let mut blob = self
            .blob
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *blob = Some(bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_roundtrip() {
        let storage = InMemoryStateStorage::new();
        assert!(storage.load().unwrap().is_none());

        storage.save(b"state-v1").unwrap();
        assert_eq!(storage.load().unwrap().unwrap(), b"state-v1");

        storage.save(b"state-v2").unwrap();
        assert_eq!(storage.load().unwrap().unwrap(), b"state-v2");
    }
}
