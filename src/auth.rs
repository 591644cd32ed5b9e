//! Persisted auth token storage
//!
//! A [`TokenStore`] is the key/value store a signed-in session leaves its
//! token in. Hosts without such storage use [`NoTokenStore`].

use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Key the session token is stored under
pub const AUTH_TOKEN_KEY: &str = "authToken";

pub trait TokenStore: Send + Sync {
    /// Stored value for `key`, if any
    fn get(&self, key: &str) -> Option<String>;
}

/// Host without persistent storage
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTokenStore;

impl TokenStore for NoTokenStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

/// In-memory store
///
/// A lock poisoned by a panicking writer is recovered rather than dropping
/// later reads and writes.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

/// Store persisted as a flat JSON object in a file
///
/// The file is read on every lookup. A missing or malformed file reads as
/// an empty store.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `value` under `key`, keeping the other entries
    ///
    /// A malformed file is replaced by a store holding only `key`; its
    /// previous contents are lost.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = match self.read_entries() {
            Some(entries) => entries,
            None => {
                if self.path.exists() {
                    tracing::warn!(
                        path = %self.path.display(),
                        "Replacing unreadable token store"
                    );
                }
                HashMap::new()
            }
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(&entries)?)?;
        Ok(())
    }

    fn read_entries(&self) -> Option<HashMap<String, String>> {
        let content = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&content) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "Ignoring malformed token store"
                );
                None
            }
        }
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries()?.remove(key)
    }
}
