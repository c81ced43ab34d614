//! Search result memo with LRU eviction

use crate::search::{Hit, SearchEngine, SearchResults};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(128) {
    Some(n) => n,
    None => unreachable!(),
};

/// Memoizes full hit lists per exact term. The corpus never changes, so an
/// entry is valid for the process lifetime.
pub struct SearchCache {
    cache: Mutex<LruCache<String, Arc<Vec<Hit>>>>,
}

impl SearchCache {
    pub fn new(capacity: usize) -> Self {
        let cache = LruCache::new(NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY));
        Self { cache: Mutex::new(cache) }
    }

    pub fn get_or_search(&self, engine: &SearchEngine, term: &str) -> Arc<Vec<Hit>> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hits) = cache.get(term) {
                return Arc::clone(hits);
            }
        }

        let hits = Arc::new(engine.search(term));
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(term.to_string(), Arc::clone(&hits));
        }
        hits
    }

    pub fn query(&self, engine: &SearchEngine, term: &str, limit: usize, offset: usize) -> SearchResults {
        let start = std::time::Instant::now();
        let hits = self.get_or_search(engine, term);
        SearchEngine::page(term, &hits, limit, offset, start)
    }

    pub fn clear(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    /// (entries, capacity)
    pub fn stats(&self) -> (usize, usize) {
        match self.cache.lock() {
            Ok(cache) => (cache.len(), cache.cap().get()),
            Err(_) => (0, 0),
        }
    }
}
