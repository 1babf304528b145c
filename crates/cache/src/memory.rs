//! In-process LRU tier with per-entry TTL
//!
//! Entries move through: absent → present (insert) → expired (ttl elapsed)
//! → absent (removed on lookup or under capacity pressure).
//!
//! When an insert finds the tier full, expired entries are purged first; if
//! that frees nothing, the least-recently-used share of the tier
//! (`eviction_fraction`, at least one entry) is dropped in one batch.

use lru::LruCache;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Stored value plus its expiry
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Cached value
    pub value: V,
    /// Instant after which the entry is stale
    pub expires_at: Instant,
}

impl<V> CacheEntry<V> {
    /// Whether the entry is stale at `now`
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Bounded LRU map with TTL
///
/// # Thread Safety
///
/// All access goes through one `parking_lot::Mutex`; lookups update recency
/// and therefore need the lock as well.
pub struct MemoryTier<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    capacity: usize,
    eviction_fraction: f32,
    evictions: AtomicU64,
}

impl<V: Clone> MemoryTier<V> {
    /// Create a tier holding up to `capacity` entries
    pub fn new(capacity: usize, eviction_fraction: f32) -> Self {
        MemoryTier {
            entries: Mutex::new(LruCache::unbounded()),
            capacity: capacity.max(1),
            eviction_fraction: eviction_fraction.clamp(0.0, 1.0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Live value for `key`, refreshing its recency
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let expired = entries.peek(key)?.is_expired(Instant::now());
        if expired {
            entries.pop(key);
            return None;
        }
        entries.get(key).map(|e| e.value.clone())
    }

    /// Insert or replace `key`
    pub fn insert(&self, key: String, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if !entries.contains(&key) && entries.len() >= self.capacity {
            let purged = purge_expired(&mut entries, now);
            if purged == 0 {
                let mut evicted = 0u64;
                for _ in 0..self.batch_size() {
                    if entries.pop_lru().is_none() {
                        break;
                    }
                    evicted += 1;
                }
                self.evictions.fetch_add(evicted, Ordering::Relaxed);
            }
        }

        entries.put(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    /// Remove `key`; true when something was removed
    pub fn remove(&self, key: &str) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Drop expired entries now; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        purge_expired(&mut self.entries.lock(), Instant::now())
    }

    /// Entries currently held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when no entries are held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries dropped by batch eviction since creation
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    fn batch_size(&self) -> usize {
        ((self.capacity as f32 * self.eviction_fraction).round() as usize).max(1)
    }
}

fn purge_expired<V>(entries: &mut LruCache<String, CacheEntry<V>>, now: Instant) -> usize {
    let stale: Vec<String> = entries
        .iter()
        .filter(|(_, e)| e.is_expired(now))
        .map(|(k, _)| k.clone())
        .collect();
    for key in &stale {
        entries.pop(key);
    }
    stale.len()
}
