//! # Result Cache
//!
//! TTL memoization of aggregated responses, keyed by normalized query.
//!
//! A hit is served as stored until it expires, even if providers would now
//! answer differently. Expired entries are removed lazily on read and by
//! [`ResultCache::evict_expired`]. When full, an insert first drops expired
//! entries and then, if still full, the entry closest to expiry.
//!
//! Failures are never cached: callers only `put` successful responses.

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Configuration for the result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultCacheConfig {
    /// Entry lifetime.
    pub ttl: Duration,
    /// Maximum number of entries.
    pub max_entries: usize,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            max_entries: 2048,
        }
    }
}

/// Cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored, expired or not.
    pub entries: usize,
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that missed or found an expired entry.
    pub misses: u64,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// Thread-safe TTL cache with a capacity bound.
#[derive(Debug)]
pub struct ResultCache<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, CacheEntry<V>>,
    config: ResultCacheConfig,
    insert_lock: Mutex<()>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> ResultCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty cache.
    #[must_use]
    pub fn new(config: ResultCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            insert_lock: Mutex::new(()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ResultCacheConfig {
        &self.config
    }

    /// Returns the live value for `key`, removing it if expired.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if entry.is_live(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| !entry.is_live(now));
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Stores `value` with the configured TTL.
    pub fn put(&self, key: K, value: V) {
        self.put_with_ttl(key, value, self.config.ttl);
    }

    /// Stores `value` for `ttl`.
    pub fn put_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let _guard = self.insert_lock.lock();
        let now = Instant::now();

        if !self.entries.contains_key(&key) && self.entries.len() >= self.config.max_entries {
            self.entries.retain(|_, entry| entry.is_live(now));
            while self.entries.len() >= self.config.max_entries {
                let Some(victim) = self
                    .entries
                    .iter()
                    .min_by_key(|entry| entry.expires_at)
                    .map(|entry| entry.key().clone())
                else {
                    break;
                };
                self.entries.remove(&victim);
            }
        }

        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    /// Removes every expired entry. Returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of stored entries, including expired ones not yet
    /// evicted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<K, V> Default for ResultCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new(ResultCacheConfig::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cache(ttl_secs: u64, max_entries: usize) -> ResultCache<String, u32> {
        ResultCache::new(ResultCacheConfig {
            ttl: Duration::from_secs(ttl_secs),
            max_entries,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn hit_within_ttl() {
        let cache = cache(60, 10);
        cache.put("k".into(), 7);
        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get(&"k".to_string()), Some(7));
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_a_miss_and_removed() {
        let cache = cache(60, 10);
        cache.put("k".into(), 7);
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(cache.get(&"k".to_string()), None);
        assert!(cache.is_empty());
        assert_eq!(cache.stats().misses, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_expired_first() {
        let cache = cache(60, 2);
        cache.put_with_ttl("short".into(), 1, Duration::from_secs(5));
        cache.put("long".into(), 2);
        tokio::time::advance(Duration::from_secs(10)).await;

        cache.put("new".into(), 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"long".to_string()), Some(2));
        assert_eq!(cache.get(&"new".to_string()), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_soonest_expiry() {
        let cache = cache(60, 2);
        cache.put("a".into(), 1);
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.put("b".into(), 2);
        cache.put("c".into(), 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&"a".to_string()), None);
        assert_eq!(cache.get(&"b".to_string()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn overwrite_does_not_evict() {
        let cache = cache(60, 2);
        cache.put("a".into(), 1);
        cache.put("b".into(), 2);
        cache.put("a".into(), 10);
        assert_eq!(cache.get(&"a".to_string()), Some(10));
        assert_eq!(cache.get(&"b".to_string()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn evict_expired_sweeps() {
        let cache = cache(10, 10);
        cache.put("a".into(), 1);
        cache.put_with_ttl("b".into(), 2, Duration::from_secs(30));
        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.evict_expired(), 1);
        assert_eq!(cache.len(), 1);
    }
}
