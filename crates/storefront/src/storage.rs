//! Local persistent key-value store.
//!
//! Holds the offline cart backup, the auth session and the recently viewed
//! list between runs. Everything in here is best effort and unversioned:
//! an unreadable or malformed entry loads as absent, and callers log and
//! carry on when a write fails.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Well-known store keys.
pub mod keys {
    /// Offline backup of the cart lines.
    pub const CART_ITEMS: &str = "cart_items";
    /// Signed-in session (user and token).
    pub const AUTH_SESSION: &str = "auth_session";
    /// Recently viewed product ids.
    pub const RECENTLY_VIEWED: &str = "recently_viewed";
}

/// Errors from the local store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid store key '{0}'")]
    InvalidKey(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A JSON value store keyed by short names.
pub trait LocalStore: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be read or decoded.
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError>;

    /// Delete the value under `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry exists but cannot be deleted.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Load and decode `key`, treating any failure as absent.
pub fn load_json<T: DeserializeOwned>(store: &dyn LocalStore, key: &str) -> Option<T> {
    let value = match store.load(key) {
        Ok(value) => value?,
        Err(e) => {
            warn!(key, error = %e, "Failed to read local store entry");
            return None;
        }
    };
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            warn!(key, error = %e, "Ignoring malformed local store entry");
            None
        }
    }
}

/// Encode and save `value` under `key`, logging failures.
pub fn save_json<T: Serialize + ?Sized>(store: &dyn LocalStore, key: &str, value: &T) {
    let result = serde_json::to_value(value)
        .map_err(StoreError::from)
        .and_then(|value| store.save(key, &value));
    if let Err(e) = result {
        warn!(key, error = %e, "Failed to write local store entry");
    }
}

/// Delete `key`, logging failures.
pub fn remove_entry(store: &dyn LocalStore, key: &str) {
    if let Err(e) = store.remove(key) {
        warn!(key, error = %e, "Failed to delete local store entry");
    }
}

fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

// =============================================================================
// FileStore
// =============================================================================

/// One `<key>.json` file per entry in a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl LocalStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let path = self.path(key)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path)(e)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        // Entries are replaced atomically.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(&tmp, contents).map_err(io_error(&tmp))?;
        std::fs::rename(&tmp, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// In-process store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
        validate_key(key)?;
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
