//! File-backed preference store.
//!
//! The SPA this service replaces kept filters, search history, and the auth
//! snapshot in `localStorage`; here the same keys live in one JSON file.
//! Every `set` persists immediately. A missing or corrupted file degrades to
//! an empty store rather than failing startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors from persisting preferences.
#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A small key-value store persisted as a single JSON object on disk.
pub struct PreferenceStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, Value>>,
}

impl PreferenceStore {
    /// Open the store at `path`, loading existing entries when present.
    ///
    /// Corrupted or unreadable files are ignored and logged at debug; the
    /// store starts empty in that case.
    #[must_use]
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => map,
                Err(e) => {
                    debug!(error = %e, path = %path.display(), "Corrupted preference file, starting empty");
                    BTreeMap::new()
                }
            },
            Err(e) => {
                debug!(error = %e, path = %path.display(), "No preference file, starting empty");
                BTreeMap::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        }
    }

    /// Read and deserialize a stored value.
    ///
    /// Returns `None` when the key is absent or the stored value no longer
    /// deserializes as `T` (stale schema degrades silently, like a corrupted
    /// `localStorage` entry).
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let guard = self.entries.read().ok()?;
        let value = guard.get(key)?.clone();
        drop(guard);
        serde_json::from_value(value).ok()
    }

    /// Store a value and persist the whole file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the file write fails.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), PrefsError> {
        let value = serde_json::to_value(value)?;
        if let Ok(mut guard) = self.entries.write() {
            guard.insert(key.to_string(), value);
        }
        self.flush()
    }

    /// Remove a key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file write fails.
    pub fn remove(&self, key: &str) -> Result<(), PrefsError> {
        if let Ok(mut guard) = self.entries.write() {
            guard.remove(key);
        }
        self.flush()
    }

    fn flush(&self) -> Result<(), PrefsError> {
        let snapshot = self
            .entries
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default();
        let raw = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// Keys used by the storefront (mirrors the SPA's `localStorage` keys).
pub mod keys {
    /// Persisted auth snapshot (`{token, user}`).
    pub const AUTH_SESSION: &str = "auth.session";
    /// Catalog filter/sort/view-mode state.
    pub const CATALOG_FILTERS: &str = "catalog.filters";
    /// Bounded recent-search list.
    pub const SEARCH_HISTORY: &str = "catalog.searchHistory";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aurora-prefs-test-{name}-{}.json", std::process::id()))
    }

    #[test]
    fn test_roundtrip() {
        let path = temp_path("roundtrip");
        let store = PreferenceStore::open(&path);
        store.set("k", &vec!["a".to_string(), "b".to_string()]).unwrap();

        // Reopen from disk
        let reopened = PreferenceStore::open(&path);
        let back: Vec<String> = reopened.get("k").unwrap();
        assert_eq!(back, vec!["a", "b"]);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_corrupted_file_degrades_to_empty() {
        let path = temp_path("corrupt");
        std::fs::write(&path, "{not json").unwrap();
        let store = PreferenceStore::open(&path);
        assert!(store.get::<Value>("anything").is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_stale_schema_degrades_to_none() {
        let path = temp_path("stale");
        let store = PreferenceStore::open(&path);
        store.set("k", &42_u32).unwrap();
        assert!(store.get::<Vec<String>>("k").is_none());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_remove() {
        let path = temp_path("remove");
        let store = PreferenceStore::open(&path);
        store.set("k", &1_u32).unwrap();
        store.remove("k").unwrap();
        assert!(store.get::<u32>("k").is_none());
        std::fs::remove_file(&path).ok();
    }
}
