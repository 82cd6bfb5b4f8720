//! Key/value storage backing the credential store and the mock user table.
//!
//! DESIGN
//! ======
//! Everything the portal persists is a flat string-keyed, string-valued map,
//! the same shape browser local storage has. `MemoryStore` keeps it in a
//! mutex-guarded map; `FileStore` mirrors that map into a JSON object file so
//! state survives between CLI invocations.
//!
//! TRADE-OFFS
//! ==========
//! `FileStore` rewrites the whole file on every mutation. The map holds a
//! handful of keys, so simplicity wins over incremental writes.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path} is not a JSON object: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// =============================================================================
// TRAIT
// =============================================================================

/// Synchronous string key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or overwrite a value.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent backend fails to write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a persistent backend fails to write.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// MEMORY STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// =============================================================================
// FILE STORE
// =============================================================================

/// JSON-file-backed store. The file holds a single flat object.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or is not a JSON object
    /// of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StorageError::Json { path: path.clone(), source })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StorageError::Io { path, source }),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened file store");
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io { path: self.path.clone(), source };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(entries)
            .map_err(|source| StorageError::Json { path: self.path.clone(), source })?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_owned(), value.to_owned());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.flush(&entries)
    }
}

// =============================================================================
// TEST DOUBLE
// =============================================================================

/// Memory store whose writes to one chosen key fail with an io error.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingStore {
    inner: MemoryStore,
    fail_key: Mutex<Option<String>>,
}

#[cfg(test)]
impl FailingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// From now on, `set` and `remove` on `key` fail.
    pub fn fail_on(&self, key: &str) {
        *lock(&self.fail_key) = Some(key.to_owned());
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if lock(&self.fail_key).as_deref() == Some(key) {
            return Err(StorageError::Io { path: PathBuf::from(key), source: std::io::Error::other("disk full") });
        }
        Ok(())
    }
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.remove(key)
    }
}

#[cfg(test)]
#[path = "storage_test.rs"]
mod tests;
