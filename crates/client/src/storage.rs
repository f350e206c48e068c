//! Device-local key-value storage.
//!
//! Values are JSON documents keyed by short strings. A missing key is
//! `Ok(None)`, never an error; call sites that only need a best-effort read
//! use [`StorageExt::get_or_default`], which also swallows read failures.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage keys shared by the stores and the default interceptors.
pub mod keys {
    /// Bearer token for the `Authorization` header.
    pub const TOKEN: &str = "token";
    pub const USER_INFO: &str = "userInfo";
    pub const IS_LOGGED_IN: &str = "isLoggedIn";
    pub const SEARCH_HISTORY: &str = "searchHistory";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// A key-value store for small JSON blobs.
pub trait Storage: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_raw(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Remove a key. Removing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Typed helpers over any [`Storage`].
pub trait StorageExt: Storage {
    /// Read and decode a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails or the stored value does not decode as `T`.
    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get_raw(key)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(StorageError::from)
    }

    /// Encode and write a value.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        self.set_raw(key, serde_json::to_value(value)?)
    }

    /// Read a value, falling back to `T::default()` on a miss or any failure.
    fn get_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                warn!(key, error = %e, "Storage read failed, using default");
                T::default()
            }
        }
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    mutex.lock().map_err(|_| StorageError::Poisoned)
}

/// In-process storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, Value>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: Value) -> Result<(), StorageError> {
        lock(&self.entries)?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object on disk.
///
/// The whole file is rewritten on every mutation, via a temporary file and a
/// rename so a crash never leaves a half-written document.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, Value>>,
}

impl FileStorage {
    /// Open (or lazily create) the storage file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        debug!(path = %path.display(), keys = entries.len(), "Opened file storage");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get_raw(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries)?;
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries)?;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get::<String>(keys::TOKEN).unwrap(), None);

        storage.set(keys::TOKEN, "abc").unwrap();
        assert_eq!(storage.get::<String>(keys::TOKEN).unwrap(), Some("abc".to_string()));

        storage.remove(keys::TOKEN).unwrap();
        assert_eq!(storage.get::<String>(keys::TOKEN).unwrap(), None);
    }

    #[test]
    fn test_get_or_default_swallows_type_mismatch() {
        let storage = MemoryStorage::new();
        storage.set(keys::IS_LOGGED_IN, "not a bool").unwrap();
        assert!(!storage.get_or_default::<bool>(keys::IS_LOGGED_IN));
        assert!(storage.get::<bool>(keys::IS_LOGGED_IN).is_err());
    }

    #[test]
    fn test_file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::SEARCH_HISTORY, &vec!["tea", "mug"]).unwrap();
        storage.set(keys::TOKEN, "t-1").unwrap();
        storage.remove(keys::TOKEN).unwrap();

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get::<Vec<String>>(keys::SEARCH_HISTORY).unwrap(),
            Some(vec!["tea".to_string(), "mug".to_string()])
        );
        assert_eq!(reopened.get::<String>(keys::TOKEN).unwrap(), None);
    }

    #[test]
    fn test_file_storage_failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::USER_INFO, "kept").unwrap();

        // A directory where the temporary file goes makes every write fail.
        fs::create_dir(dir.path().join("s.tmp")).unwrap();

        assert!(matches!(
            storage.set(keys::TOKEN, "t-1"),
            Err(StorageError::Io(_))
        ));
        assert_eq!(storage.get::<String>(keys::TOKEN).unwrap(), None);

        assert!(storage.remove(keys::USER_INFO).is_err());
        assert_eq!(
            storage.get::<String>(keys::USER_INFO).unwrap().as_deref(),
            Some("kept")
        );

        fs::remove_dir(dir.path().join("s.tmp")).unwrap();
        storage.set(keys::SEARCH_HISTORY, &["tea"]).unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get::<String>(keys::TOKEN).unwrap(), None);
        assert_eq!(
            reopened.get::<String>(keys::USER_INFO).unwrap().as_deref(),
            Some("kept")
        );
    }

    #[test]
    fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStorage::open(&path),
            Err(StorageError::Serialization(_))
        ));
    }
}
