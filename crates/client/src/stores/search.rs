//! Recent search keywords, most recent first.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::storage::{Storage, StorageError, StorageExt, keys};

/// Number of keywords kept.
pub const MAX_HISTORY: usize = 10;

pub struct SearchHistory {
    storage: Arc<dyn Storage>,
    keywords: Vec<String>,
}

impl fmt::Debug for SearchHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchHistory")
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}

impl SearchHistory {
    #[must_use]
    pub const fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            keywords: Vec::new(),
        }
    }

    /// Reload from storage. A missing or unreadable entry is an empty history.
    pub fn load(&mut self) -> &[String] {
        let mut keywords: Vec<String> = self.storage.get_or_default(keys::SEARCH_HISTORY);
        keywords.truncate(MAX_HISTORY);
        self.keywords = keywords;
        &self.keywords
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Move `keyword` to the front and persist. Blank keywords are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be written; the in-memory
    /// history is updated regardless.
    pub fn record(&mut self, keyword: &str) -> Result<(), StorageError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(());
        }
        self.keywords.retain(|k| k != keyword);
        self.keywords.insert(0, keyword.to_string());
        self.keywords.truncate(MAX_HISTORY);
        debug!(keyword, len = self.keywords.len(), "Recorded search");
        self.persist()
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the history cannot be written.
    pub fn remove(&mut self, keyword: &str) -> Result<(), StorageError> {
        let keyword = keyword.trim();
        self.keywords.retain(|k| k != keyword);
        self.persist()
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the stored history cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.keywords.clear();
        self.storage.remove(keys::SEARCH_HISTORY)
    }

    fn persist(&self) -> Result<(), StorageError> {
        self.storage.set(keys::SEARCH_HISTORY, &self.keywords)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStorage;

    fn history() -> (Arc<MemoryStorage>, SearchHistory) {
        let storage = Arc::new(MemoryStorage::new());
        let history = SearchHistory::new(storage.clone());
        (storage, history)
    }

    #[test]
    fn test_record_dedupes_and_orders() {
        let (_, mut history) = history();
        history.record("tea").unwrap();
        history.record(" mug ").unwrap();
        history.record("tea").unwrap();
        history.record("   ").unwrap();
        assert_eq!(history.keywords(), ["tea", "mug"]);
    }

    #[test]
    fn test_record_caps_length() {
        let (_, mut history) = history();
        for i in 0..15 {
            history.record(&format!("k{i}")).unwrap();
        }
        assert_eq!(history.keywords().len(), MAX_HISTORY);
        assert_eq!(history.keywords()[0], "k14");
        assert_eq!(history.keywords()[MAX_HISTORY - 1], "k5");
    }

    #[test]
    fn test_persists_and_loads() {
        let (storage, mut history) = history();
        history.record("tea").unwrap();
        history.record("mug").unwrap();

        let mut reloaded = SearchHistory::new(storage.clone());
        assert_eq!(reloaded.load(), ["mug", "tea"]);

        reloaded.remove("tea").unwrap();
        assert_eq!(storage.get_raw(keys::SEARCH_HISTORY).unwrap(), Some(json!(["mug"])));

        reloaded.clear().unwrap();
        assert!(reloaded.keywords().is_empty());
        assert!(storage.get_raw(keys::SEARCH_HISTORY).unwrap().is_none());
    }

    #[test]
    fn test_load_ignores_corrupt_entry() {
        let (storage, mut history) = history();
        storage.set_raw(keys::SEARCH_HISTORY, json!({"not": "a list"})).unwrap();
        assert!(history.load().is_empty());
    }
}
