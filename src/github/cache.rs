use std::num::NonZeroUsize;

use lru::LruCache;
use serde_json::Value;

/// Default number of cached responses per client.
pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone)]
struct CacheEntry {
    etag: String,
    payload: Value,
}

/// ETag-validated response cache with least-recently-used eviction.
///
/// Reading a validator does not count as a use; only inserts and successful
/// revalidations move an entry to the front.
#[derive(Debug)]
pub struct ResponseCache {
    entries: LruCache<String, CacheEntry>,
}

impl ResponseCache {
    /// A zero capacity is bumped to one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
        }
    }

    /// Validator to send as `If-None-Match` for `key`, if we hold one.
    pub fn validator(&self, key: &str) -> Option<String> {
        self.entries.peek(key).map(|e| e.etag.clone())
    }

    /// Payload for a `304 Not Modified` answer; promotes the entry.
    pub fn revalidate(&mut self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|e| e.payload.clone())
    }

    pub fn store(&mut self, key: String, etag: String, payload: Value) {
        self.entries.put(key, CacheEntry { etag, payload });
    }

    #[cfg(test)]
    fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Cache key for a request: the path plus its query string in the given order.
pub fn cache_key(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let params: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", path, params.join("&"))
}
