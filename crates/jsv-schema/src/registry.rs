//! Shared document cache

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

/// Concurrent cache of fetched documents keyed by absolute URI
///
/// Loaders that share a cache fetch each remote document once; parsed
/// documents are handed out as cheap `Arc` clones.
#[derive(Debug, Default)]
pub struct DocumentCache {
    entries: DashMap<String, Arc<Value>>,
}

impl DocumentCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Cached document for a URI, if present.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<Arc<Value>> {
        self.entries.get(uri).map(|entry| entry.value().clone())
    }

    /// Store a parsed document.
    pub fn insert(&self, uri: impl Into<String>, document: Arc<Value>) {
        self.entries.insert(uri.into(), document);
    }

    /// Number of cached documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every cached document.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stores_and_returns_documents() {
        let cache = DocumentCache::new();
        assert!(cache.is_empty());

        cache.insert("mem://a.json", Arc::new(json!({"type": "object"})));
        assert_eq!(cache.len(), 1);

        let hit = cache.get("mem://a.json").unwrap();
        assert_eq!(*hit, json!({"type": "object"}));
        assert!(cache.get("mem://b.json").is_none());
    }

    #[test]
    fn clear_empties_the_cache() {
        let cache = DocumentCache::new();
        cache.insert("mem://a.json", Arc::new(json!(true)));
        cache.clear();
        assert!(cache.is_empty());
    }
}
