//! CLIENT-LOCAL PERSISTENCE
//!
//! A tiny string-to-string store standing in for browser local
//! storage. The session store only ever touches two keys.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::StorageError;

/// Serialized active identity.
pub const CURRENT_USER_KEY: &str = "current_user";
/// `"true"` while a connection should survive a restart.
pub const WALLET_CONNECTED_KEY: &str = "wallet_connected";

/// Durable key-value storage injected into the session store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// In-memory store. Clones share the same map, which is how tests simulate a
/// page reload: drop the store, reopen over a clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// JSON-object file on disk. The whole file is re-read on every access and
/// replaced atomically on every write, so a reader never sees a half-written
/// object. Concurrent writers from different processes are last-writer-wins.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_err(e)),
        }
    }

    /// Like [`load`](Self::load), but an unparseable file counts as empty so
    /// the next write replaces it instead of failing forever.
    fn load_for_write(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match self.load() {
            Err(StorageError::Serialization(e)) => {
                warn!(path = %self.path.display(), error = %e, "overwriting malformed file store");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
                parent
            }
            None => Path::new("."),
        };
        let body = serde_json::to_string_pretty(entries)?;
        // Unique per write, so concurrent savers never share a temp file.
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.io_err(e))?;
        tmp.write_all(body.as_bytes()).map_err(|e| self.io_err(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_err(e.error))?;
        debug!(path = %self.path.display(), keys = entries.len(), "file store saved");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load_for_write()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(StorageError::Serialization(e)) => {
                warn!(path = %self.path.display(), error = %e, "resetting malformed file store");
                return self.save(&BTreeMap::new());
            }
            Err(e) => return Err(e),
        };
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let reloaded = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(reloaded.get("k").unwrap().as_deref(), Some("v"));
        reloaded.delete("k").unwrap();
        assert!(store.is_empty());
        // Deleting twice is fine.
        reloaded.delete("k").unwrap();
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested/session.json"));
        assert_eq!(store.get(CURRENT_USER_KEY).unwrap(), None);
        store.delete(CURRENT_USER_KEY).unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_round_trip_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/session.json");

        let store = FileStore::new(&path);
        store.set(WALLET_CONNECTED_KEY, "true").unwrap();
        store.set(CURRENT_USER_KEY, "{}").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(WALLET_CONNECTED_KEY).unwrap().as_deref(), Some("true"));

        reopened.delete(WALLET_CONNECTED_KEY).unwrap();
        assert_eq!(store.get(WALLET_CONNECTED_KEY).unwrap(), None);
        assert_eq!(store.get(CURRENT_USER_KEY).unwrap().as_deref(), Some("{}"));
    }

    #[test]
    fn test_file_store_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get(CURRENT_USER_KEY), Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_file_store_writes_replace_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        fs::write(&path, "garbage").unwrap();
        let store = FileStore::new(&path);
        store.delete(CURRENT_USER_KEY).unwrap();
        assert_eq!(store.get(CURRENT_USER_KEY).unwrap(), None);

        fs::write(&path, "garbage").unwrap();
        store.set(WALLET_CONNECTED_KEY, "true").unwrap();
        assert_eq!(store.get(WALLET_CONNECTED_KEY).unwrap().as_deref(), Some("true"));
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        for i in 0..5 {
            store.set(CURRENT_USER_KEY, &i.to_string()).unwrap();
        }
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("session.json")]);
    }
}
