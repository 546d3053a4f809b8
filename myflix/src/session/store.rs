//! Key-value storage backends for the client session.
//!
//! The session only ever needs a couple of string slots, so backends expose
//! plain `get`/`set`/`remove` over strings, like browser local storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised when a store cannot persist a write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode session data: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String-valued key-value storage.
///
/// Reads never fail: anything unreadable is reported as absent.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every operation re-reads the file so separate CLI invocations see each
/// other's writes. Writes go to a sibling temp file first and are renamed
/// into place.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Open a store at `path`. The file is created lazily on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Default location: `<data dir>/myflix/session.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("myflix").join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Map<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read session file");
                return Map::new();
            }
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                warn!(path = %self.path.display(), "Session file is not a JSON object, ignoring it");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(map)?;
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(io_err)?;
        std::fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        debug!(path = %self.path.display(), "Session file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.read_map().remove(key)? {
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map();
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut map = self.read_map();
        if map.remove(key).is_none() {
            return Ok(());
        }
        self.write_map(&map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("token"), None);

        store.set("token", "t1").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("t1"));

        store.remove("token").unwrap();
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.json");

        FileStore::new(&path).set("token", "t1").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("token").as_deref(), Some("t1"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get("user"), None);
        store.remove("user").unwrap();
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_malformed_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileStore::new(&path);
        assert_eq!(store.get("token"), None);

        // A write replaces the garbage with a valid object.
        store.set("token", "t2").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("t2"));
    }
}
