//! Persisted catalog UI state: filters, sort, view mode, search history.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prefs::{PreferenceStore, keys};

use super::filter::ProductFilter;
use super::sort::SortKey;

/// Recent searches kept, most recent first.
const MAX_SEARCH_HISTORY: usize = 10;

/// Grid or list rendering of the product grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    #[serde(rename = "grid")]
    Grid,
    #[serde(rename = "list")]
    List,
}

/// Catalog state that survives restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPrefs {
    pub filter: ProductFilter,
    pub sort: SortKey,
    pub view_mode: ViewMode,
}

/// Load and save catalog preferences and the bounded search history.
pub struct CatalogPrefsStore {
    store: Arc<PreferenceStore>,
}

impl CatalogPrefsStore {
    #[must_use]
    pub fn new(store: Arc<PreferenceStore>) -> Self {
        Self { store }
    }

    /// Stored preferences, or defaults when absent or stale.
    #[must_use]
    pub fn load(&self) -> CatalogPrefs {
        self.store
            .get(keys::CATALOG_FILTERS)
            .unwrap_or_default()
    }

    pub fn save(&self, prefs: &CatalogPrefs) {
        if let Err(e) = self.store.set(keys::CATALOG_FILTERS, prefs) {
            debug!(error = %e, "Could not persist catalog preferences");
        }
    }

    /// Recent searches, most recent first.
    #[must_use]
    pub fn search_history(&self) -> Vec<String> {
        self.store.get(keys::SEARCH_HISTORY).unwrap_or_default()
    }

    /// Record a search term: deduplicated, promoted to the front, capped.
    /// Blank terms are ignored.
    pub fn record_search(&self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }

        let history = push_search(self.search_history(), term);
        if let Err(e) = self.store.set(keys::SEARCH_HISTORY, &history) {
            debug!(error = %e, "Could not persist search history");
        }
    }

    pub fn clear_search_history(&self) {
        if let Err(e) = self.store.remove(keys::SEARCH_HISTORY) {
            debug!(error = %e, "Could not clear search history");
        }
    }
}

fn push_search(mut history: Vec<String>, term: &str) -> Vec<String> {
    history.retain(|t| !t.eq_ignore_ascii_case(term));
    history.insert(0, term.to_string());
    history.truncate(MAX_SEARCH_HISTORY);
    history
}
