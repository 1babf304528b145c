//! Memory-then-shared result cache
//!
//! ```text
//! get: memory ──hit──▶ value
//!        │miss
//!        ▼
//!      shared ──hit──▶ promote into memory ──▶ value
//!        │miss / error
//!        ▼
//!      None
//! ```
//!
//! Shared keys carry a generation prefix. `invalidate_all` clears memory and
//! bumps the generation, so entries written before it can no longer be read
//! from the shared tier even though the store still holds them until expiry.

use crate::memory::MemoryTier;
use crate::shared::{SharedStore, StoreError};
use sift_core::CacheConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Tier that answered a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// In-process LRU
    Memory,
    /// Shared store
    Shared,
}

/// Counter snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by memory
    pub memory_hits: u64,
    /// Lookups answered by the shared store
    pub shared_hits: u64,
    /// Lookups answered by neither
    pub misses: u64,
    /// Shared-store operations that failed
    pub shared_errors: u64,
    /// Memory entries dropped by batch eviction
    pub evictions: u64,
    /// Memory entries currently held
    pub memory_entries: usize,
    /// Current invalidation generation
    pub generation: u64,
}

impl CacheStats {
    /// Hits over lookups, 0.0 before the first lookup
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.shared_hits;
        let total = hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }
}

#[derive(Debug, Default)]
struct Counters {
    memory_hits: AtomicU64,
    shared_hits: AtomicU64,
    misses: AtomicU64,
    shared_errors: AtomicU64,
}

/// Two-tier TTL cache of formatted results
pub struct TieredCache {
    memory: MemoryTier<String>,
    shared: Option<Arc<dyn SharedStore>>,
    default_ttl: Duration,
    generation: AtomicU64,
    counters: Counters,
}

impl TieredCache {
    /// Memory-only cache sized from configuration
    pub fn new(cfg: &CacheConfig) -> Self {
        TieredCache {
            memory: MemoryTier::new(cfg.memory_capacity, cfg.eviction_fraction),
            shared: None,
            default_ttl: Duration::from_secs(cfg.ttl_secs),
            generation: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    /// Attach a shared tier
    pub fn with_shared(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.shared = Some(store);
        self
    }

    /// Whether a shared tier is attached
    pub fn has_shared(&self) -> bool {
        self.shared.is_some()
    }

    /// TTL applied by [`insert`](Self::insert) and on promotion
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Value and answering tier for `key`
    pub fn lookup(&self, key: &str) -> Option<(String, CacheTier)> {
        if let Some(value) = self.memory.get(key) {
            self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
            debug!(tier = "memory", "Cache hit");
            return Some((value, CacheTier::Memory));
        }

        if let Some(store) = &self.shared {
            match store.get(&self.shared_key(key)) {
                Ok(Some(value)) => {
                    self.counters.shared_hits.fetch_add(1, Ordering::Relaxed);
                    debug!(tier = "shared", store = store.name(), "Cache hit");
                    self.memory
                        .insert(key.to_string(), value.clone(), self.default_ttl);
                    return Some((value, CacheTier::Shared));
                }
                Ok(None) => {}
                Err(e) => self.record_shared_error("get", &e),
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Value for `key` from either tier
    pub fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|(value, _)| value)
    }

    /// Write `value` to both tiers
    pub fn set(&self, key: &str, value: String, ttl: Duration) {
        if let Some(store) = &self.shared {
            if let Err(e) = store.set(&self.shared_key(key), &value, ttl) {
                self.record_shared_error("set", &e);
            }
        }
        self.memory.insert(key.to_string(), value, ttl);
    }

    /// [`set`](Self::set) with the default TTL
    pub fn insert(&self, key: &str, value: String) {
        self.set(key, value, self.default_ttl);
    }

    /// Remove `key` from both tiers
    pub fn remove(&self, key: &str) {
        self.memory.remove(key);
        if let Some(store) = &self.shared {
            if let Err(e) = store.delete(&self.shared_key(key)) {
                self.record_shared_error("delete", &e);
            }
        }
    }

    /// Make every entry written so far unreachable
    pub fn invalidate_all(&self) {
        self.memory.clear();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(generation, "Cache invalidated");
    }

    /// Current invalidation generation
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Counter snapshot
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.counters.memory_hits.load(Ordering::Relaxed),
            shared_hits: self.counters.shared_hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            shared_errors: self.counters.shared_errors.load(Ordering::Relaxed),
            evictions: self.memory.evictions(),
            memory_entries: self.memory.len(),
            generation: self.generation(),
        }
    }

    fn shared_key(&self, key: &str) -> String {
        format!("g{}|{}", self.generation(), key)
    }

    fn record_shared_error(&self, op: &str, error: &StoreError) {
        self.counters.shared_errors.fetch_add(1, Ordering::Relaxed);
        warn!(op, %error, "Shared cache tier failed, continuing without it");
    }
}
