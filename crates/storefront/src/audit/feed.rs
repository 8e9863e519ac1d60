//! In-memory audit feed.
//!
//! Holds the entries the admin viewer renders: an initial page load plus
//! live entries prepended as they arrive, capped at 500 so a long-running
//! viewer cannot grow without bound.

use std::collections::VecDeque;
use std::sync::RwLock;

use crate::api::types::AuditEntry;

/// Maximum entries retained; older ones fall off the end.
pub const FEED_CAP: usize = 500;

/// Bounded, newest-first feed of audit entries.
#[derive(Default)]
pub struct AuditFeed {
    entries: RwLock<VecDeque<AuditEntry>>,
}

impl AuditFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the feed with a freshly fetched page.
    ///
    /// The backend returns pages oldest-first; the feed stores newest-first,
    /// so the page is reversed on the way in.
    pub fn replace_with_page(&self, mut page: Vec<AuditEntry>) {
        page.reverse();
        page.truncate(FEED_CAP);
        if let Ok(mut guard) = self.entries.write() {
            *guard = page.into();
        }
    }

    /// Prepend one live entry, dropping the oldest past the cap.
    pub fn prepend(&self, entry: AuditEntry) {
        if let Ok(mut guard) = self.entries.write() {
            guard.push_front(entry);
            guard.truncate(FEED_CAP);
        }
    }

    /// Current entries, newest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<AuditEntry> {
        self.entries
            .read()
            .map(|guard| guard.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> AuditEntry {
        AuditEntry {
            request: crate::api::types::AuditRequest {
                method: Some("GET".to_string()),
                path: Some(path.to_string()),
            },
            ..Default::default()
        }
    }

    fn paths(feed: &AuditFeed) -> Vec<String> {
        feed.snapshot()
            .into_iter()
            .filter_map(|e| e.request.path)
            .collect()
    }

    #[test]
    fn test_page_load_reverses_to_newest_first() {
        let feed = AuditFeed::new();
        feed.replace_with_page(vec![entry("/a"), entry("/b"), entry("/c")]);
        assert_eq!(paths(&feed), vec!["/c", "/b", "/a"]);
    }

    #[test]
    fn test_prepend_puts_live_entries_first() {
        let feed = AuditFeed::new();
        feed.replace_with_page(vec![entry("/old")]);
        feed.prepend(entry("/live-1"));
        feed.prepend(entry("/live-2"));
        assert_eq!(paths(&feed), vec!["/live-2", "/live-1", "/old"]);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let feed = AuditFeed::new();
        for i in 0..FEED_CAP {
            feed.prepend(entry(&format!("/e{i}")));
        }
        assert_eq!(feed.len(), FEED_CAP);

        feed.prepend(entry("/newest"));
        assert_eq!(feed.len(), FEED_CAP);
        let snapshot = paths(&feed);
        assert_eq!(snapshot[0], "/newest");
        // The very first entry prepended is the one that fell off
        assert!(!snapshot.contains(&"/e0".to_string()));
    }
}
