//! Keyed in-memory cache with per-entry TTL.
//!
//! Eviction is TTL-driven only: expired entries are dropped lazily on
//! `get` and in bulk by `cleanup`, which [`spawn_cleanup`] runs on a timer.
//! A single mutex guards the entry map together with the hit/miss counters.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

/// Estimated bookkeeping bytes per entry (timestamp, ttl, hit counter).
const ENTRY_OVERHEAD_BYTES: usize = 64;

/// Size assumed for values that fail to serialize.
const UNSERIALIZABLE_VALUE_BYTES: usize = 1024;

/// A cached value with its age and TTL.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub created_at: Instant,
    pub ttl: Duration,
    pub hits: u64,
}

impl<T> CacheEntry<T> {
    fn new(value: T, ttl_ms: u64) -> Self {
        Self {
            value,
            created_at: Instant::now(),
            ttl: Duration::from_millis(ttl_ms),
            hits: 0,
        }
    }

    /// Expired once its age strictly exceeds the TTL.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) > self.ttl
    }
}

/// Snapshot of cache accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub item_count: usize,
    pub hits: u64,
    pub misses: u64,
    /// `hits / (hits + misses) * 100`, or 0 before any lookup
    pub hit_rate_percent: f64,
    pub estimated_memory_bytes: usize,
}

#[derive(Debug)]
struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    hits: u64,
    misses: u64,
}

/// TTL record cache shared across request handlers.
#[derive(Debug)]
pub struct RecordCache<T> {
    inner: Mutex<Inner<T>>,
    default_ttl_ms: u64,
}

impl<T: Clone + Serialize> RecordCache<T> {
    /// Create an empty cache whose `set_default` uses `default_ttl_ms`.
    pub fn new(default_ttl_ms: u64) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                hits: 0,
                misses: 0,
            }),
            default_ttl_ms,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store `value` under `key`, replacing any existing entry.
    pub fn set(&self, key: impl Into<String>, value: T, ttl_ms: u64) {
        self.lock()
            .entries
            .insert(key.into(), CacheEntry::new(value, ttl_ms));
    }

    /// Store `value` with the default TTL.
    pub fn set_default(&self, key: impl Into<String>, value: T) {
        self.set(key, value, self.default_ttl_ms);
    }

    /// Fetch a live value. Expired entries are removed and counted as misses.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        let mut guard = self.lock();
        let inner = &mut *guard;

        match inner.entries.get_mut(key) {
            Some(entry) if !entry.is_expired(now) => {
                entry.hits += 1;
                inner.hits += 1;
                Some(entry.value.clone())
            }
            Some(_) => {
                inner.entries.remove(key);
                inner.misses += 1;
                None
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Remove one entry. Returns whether it existed.
    pub fn delete(&self, key: &str) -> bool {
        self.lock().entries.remove(key).is_some()
    }

    /// Remove every entry and reset the counters.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.hits = 0;
        inner.misses = 0;
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        before - inner.entries.len()
    }

    /// Hit count of a single entry, if present.
    pub fn entry_hits(&self, key: &str) -> Option<u64> {
        self.lock().entries.get(key).map(|e| e.hits)
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let requests = inner.hits + inner.misses;
        let hit_rate_percent = if requests > 0 {
            inner.hits as f64 / requests as f64 * 100.0
        } else {
            0.0
        };

        let estimated_memory_bytes = inner
            .entries
            .iter()
            .map(|(key, entry)| {
                let value_bytes = serde_json::to_vec(&entry.value)
                    .map(|v| v.len())
                    .unwrap_or(UNSERIALIZABLE_VALUE_BYTES);
                key.encode_utf16().count() * 2 + ENTRY_OVERHEAD_BYTES + value_bytes
            })
            .sum();

        CacheStats {
            item_count: inner.entries.len(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate_percent,
            estimated_memory_bytes,
        }
    }

    /// All stored keys, including expired entries not yet swept.
    pub fn keys(&self) -> Vec<String> {
        self.lock().entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Run `cleanup` on `cache` every `period` until the task is aborted.
pub fn spawn_cleanup<T>(cache: Arc<RecordCache<T>>, period: Duration) -> JoinHandle<()>
where
    T: Clone + Serialize + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.cleanup();
            if removed > 0 {
                log::info!("Cache cleanup: {} expired items removed", removed);
            } else {
                log::debug!("Cache cleanup: nothing expired");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    const LONG_TTL: u64 = 60_000;

    fn wait_past(ttl_ms: u64) {
        sleep(Duration::from_millis(ttl_ms + 30));
    }

    #[test]
    fn test_get_within_ttl_counts_hits() {
        let cache = RecordCache::new(LONG_TTL);
        cache.set("stats", 42u32, LONG_TTL);

        assert_eq!(cache.get("stats"), Some(42));
        assert_eq!(cache.get("stats"), Some(42));
        assert_eq!(cache.entry_hits("stats"), Some(2));

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate_percent, 100.0);
    }

    #[test]
    fn test_missing_key_counts_miss() {
        let cache: RecordCache<u32> = RecordCache::new(LONG_TTL);
        assert_eq!(cache.get("nope"), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_expired_entry_is_evicted_on_get() {
        let cache = RecordCache::new(LONG_TTL);
        cache.set("short", "v".to_string(), 10);
        wait_past(10);

        assert_eq!(cache.get("short"), None);
        assert!(cache.keys().is_empty());
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 0);
    }

    #[test]
    fn test_set_overwrites() {
        let cache = RecordCache::new(LONG_TTL);
        cache.set_default("k", 1);
        cache.set_default("k", 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_cleanup_removes_only_expired() {
        let cache = RecordCache::new(LONG_TTL);
        cache.set("a", 1, 10);
        cache.set("b", 2, 10);
        cache.set("keep", 3, LONG_TTL);
        wait_past(10);

        // Expired keys stay visible until swept
        assert_eq!(cache.keys().len(), 3);
        assert_eq!(cache.cleanup(), 2);
        assert_eq!(cache.keys(), vec!["keep".to_string()]);
        assert_eq!(cache.cleanup(), 0);
    }

    #[test]
    fn test_delete_and_clear() {
        let cache = RecordCache::new(LONG_TTL);
        cache.set_default("a", 1);
        cache.set_default("b", 2);
        let _ = cache.get("a");
        let _ = cache.get("zzz");

        assert!(cache.delete("a"));
        assert!(!cache.delete("a"));

        cache.clear();
        assert!(cache.is_empty());
        let stats = cache.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.hit_rate_percent, 0.0);
    }

    #[test]
    fn test_hit_rate() {
        let cache = RecordCache::new(LONG_TTL);
        cache.set_default("a", 1);
        let _ = cache.get("a");
        let _ = cache.get("b");
        let _ = cache.get("c");
        let _ = cache.get("a");
        assert_eq!(cache.stats().hit_rate_percent, 50.0);
    }

    #[test]
    fn test_memory_estimate() {
        let cache = RecordCache::new(LONG_TTL);
        // key: 2 UTF-16 units * 2, value: `"abc"` is 5 bytes
        cache.set_default("가a", "abc".to_string());
        assert_eq!(cache.stats().estimated_memory_bytes, 4 + 64 + 5);
    }

    #[tokio::test]
    async fn test_spawned_cleanup_sweeps() {
        let cache = Arc::new(RecordCache::new(LONG_TTL));
        cache.set("gone", 1, 5);
        cache.set("kept", 2, LONG_TTL);

        let handle = spawn_cleanup(Arc::clone(&cache), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(120)).await;
        handle.abort();

        assert_eq!(cache.keys(), vec!["kept".to_string()]);
    }
}
