use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::RwLock;

/// Entries kept before the least recently used one is evicted.
pub const DEFAULT_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
    Some(capacity) => capacity,
    None => panic!("cache capacity must be non-zero"),
};

/// URL plus query parameters. Parameters are kept sorted by name so their
/// order does not split the cache.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    url: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    pub fn new(url: &str, params: &[(&str, &str)]) -> Self {
        let mut params: Vec<(String, String)> = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        params.sort();
        Self {
            url: url.to_owned(),
            params,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Clone, Debug)]
struct CachedResponse {
    body: Arc<str>,
    fetched_at: Instant,
}

impl CachedResponse {
    fn is_fresh_at(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < ttl
    }
}

/// Successful response bodies, memoized per key for a caller-chosen TTL.
///
/// Entries are replaced wholesale under the write lock, so a reader sees
/// either the previous body or the new one. Expired entries are dropped when
/// looked up, and the cache holds at most `capacity` entries.
pub struct ResponseCache {
    entries: RwLock<LruCache<CacheKey, CachedResponse>>,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    /// gets the stored body if it was fetched less than `ttl` ago
    pub async fn get(&self, key: &CacheKey, ttl: Duration) -> Option<Arc<str>> {
        self.get_at(key, ttl, Instant::now()).await
    }

    async fn get_at(&self, key: &CacheKey, ttl: Duration, now: Instant) -> Option<Arc<str>> {
        // lookups reorder the lru list, so even a hit needs the write lock
        let mut entries = self.entries.write().await;
        let lookup = entries
            .get(key)
            .map(|entry| entry.is_fresh_at(ttl, now).then(|| entry.body.clone()));

        match lookup {
            Some(Some(body)) => {
                tracing::debug!(url = key.url(), "cache hit");
                Some(body)
            }
            Some(None) => {
                tracing::debug!(url = key.url(), "removing expired cache entry");
                entries.pop(key);
                None
            }
            None => {
                tracing::debug!(url = key.url(), "cache miss");
                None
            }
        }
    }

    pub async fn insert(&self, key: CacheKey, body: Arc<str>) {
        self.insert_at(key, body, Instant::now()).await
    }

    async fn insert_at(&self, key: CacheKey, body: Arc<str>, fetched_at: Instant) {
        self.entries
            .write()
            .await
            .put(key, CachedResponse { body, fetched_at });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn capacity(&self) -> NonZeroUsize {
        self.entries.read().await.cap()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
