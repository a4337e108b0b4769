//! Durable key-value storage for selections and history.
//!
//! The engine never touches a global store. A `KeyValueStore` is injected and
//! wrapped in a `ScopedStore`, which namespaces keys by content type and
//! handles JSON encoding.
//!
//! ## Key Layout
//!
//! ```text
//! bulk:<content_type>:selection   → [ItemId, ...]
//! bulk:<content_type>:history     → [HistoryEntry, ...] (newest first)
//! ```

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bulk_core::{ContentType, StoreError};

// =============================================================================
// Store Trait
// =============================================================================

/// Minimal durable string store.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store. Used in tests and when persistence is not wanted.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.write().remove(key);
        Ok(())
    }
}

// =============================================================================
// File Store
// =============================================================================

/// One file per key inside a directory.
///
/// Writes go to a temporary sibling first and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        tracing::debug!("Opened file store at {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a key to a file name. Keys contain ':' which some filesystems reject.
    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", name))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value).map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

// =============================================================================
// Scoped Store
// =============================================================================

/// A store view namespaced to one content type, with JSON encoding.
#[derive(Clone)]
pub struct ScopedStore {
    inner: Arc<dyn KeyValueStore>,
    content_type: ContentType,
}

impl ScopedStore {
    pub fn new(inner: Arc<dyn KeyValueStore>, content_type: ContentType) -> Self {
        Self {
            inner,
            content_type,
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Full key for a scoped name.
    pub fn key(&self, name: &str) -> String {
        format!("bulk:{}:{}", self.content_type, name)
    }

    /// Read and decode a value.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let key = self.key(name);
        match self.inner.get(&key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::Serialization {
                    key,
                    message: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    /// Encode and write a value.
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let key = self.key(name);
        let raw = serde_json::to_string(value).map_err(|e| StoreError::Serialization {
            key: key.clone(),
            message: e.to_string(),
        })?;
        self.inner.set(&key, &raw)
    }

    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        self.inner.remove(&self.key(name))
    }
}

// =============================================================================
// Test Support
// =============================================================================


// =============================================================================
// Tests
// =============================================================================
