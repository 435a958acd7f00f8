//! Time-bounded memoization for schema lookups.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

pub const DEFAULT_TTL_MS: u64 = 86_400_000;
pub const DEFAULT_TTL: Duration = Duration::from_millis(DEFAULT_TTL_MS);

#[derive(Clone, Debug)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// String-keyed cache whose entries expire `ttl` after they were stored.
///
/// Expired entries are evicted lazily on access. Only successful fetches are
/// stored, so a failing fetch is retried on the next call. Concurrent
/// `get_or_fetch` calls for the same missing key each run their fetcher; the
/// last one to finish wins.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the fresh cached value for `key`, or runs `fetch` and caches
    /// its result if it succeeds.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            log::debug!("cache hit for '{key}'");
            return Ok(value);
        }
        log::debug!("cache miss for '{key}', fetching");
        let value = fetch().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry { value, stored_at: Instant::now() };
        self.lock().insert(key.into(), entry);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.lock();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.value.clone());
        }
        log::debug!("cache entry for '{key}' expired");
        entries.remove(key);
        None
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning whether an entry (fresh or stale) was present.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        log::debug!("clearing {} cache entries", entries.len());
        entries.clear();
    }

    /// Number of stored entries, including ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
