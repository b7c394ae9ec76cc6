//! Durable key-value byte storage backing the repositories.
//!
//! Every repository owns exactly one key. Values are whole encoded
//! collections, never deltas.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, info};

use crate::error::StoreError;

/// Extension used for files written by [`FileStore`].
const FILE_EXTENSION: &str = "json";

/// A named-slot byte store.
pub trait BlobStore: Send + Sync {
    /// Read the bytes stored under `key`, or `None` when the slot is empty.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the bytes stored under `key`.
    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Clear the slot. Removing an empty slot is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Process-local store, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        let slots = self.slots.read().map_err(|_| StoreError::Poisoned)?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut slots = self.slots.write().map_err(|_| StoreError::Poisoned)?;
        slots.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut slots = self.slots.write().map_err(|_| StoreError::Poisoned)?;
        slots.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per slot.
///
/// Writes land in a sibling temporary file which is then renamed over the
/// target, so a reader sees either the previous collection or the new one.
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root_dir`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root_dir: P) -> Result<Self, StoreError> {
        let root_dir = root_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root_dir)?;

        info!(path = %root_dir.display(), "Opened file store");

        Ok(Self { root_dir })
    }

    /// Path of the file holding `key`.
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!("{key}.{FILE_EXTENSION}"))
    }

    fn staging_path(&self, key: &str) -> PathBuf {
        self.root_dir.join(format!(".{key}.{FILE_EXTENSION}.tmp"))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        validate_key(key)?;
        match fs::read(self.slot_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        validate_key(key)?;
        let staging = self.staging_path(key);
        let target = self.slot_path(key);

        fs::write(&staging, bytes)?;
        if let Err(e) = fs::rename(&staging, &target) {
            fs::remove_file(&staging).ok();
            return Err(e.into());
        }

        debug!(key, size = bytes.len(), "Wrote slot");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        match fs::remove_file(self.slot_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("colonies_data").unwrap().is_none());

        store.set("colonies_data", b"[]").unwrap();
        assert_eq!(store.get("colonies_data").unwrap(), Some(b"[]".to_vec()));
        assert_eq!(store.len(), 1);

        store.remove("colonies_data").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.set("../escape", b"x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn test_file_store_replaces_whole_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.set("expenses_data", b"[1,2,3]").unwrap();
        store.set("expenses_data", b"[]").unwrap();

        assert_eq!(store.get("expenses_data").unwrap(), Some(b"[]".to_vec()));
        assert!(store.slot_path("expenses_data").exists());
        assert!(!dir.path().join(".expenses_data.json.tmp").exists());
    }

    #[test]
    fn test_file_store_missing_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();

        assert!(store.get("favorites_data").unwrap().is_none());
        store.remove("favorites_data").unwrap();
    }
}
