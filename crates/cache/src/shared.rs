//! Shared (cross-process) cache tier interface

use dashmap::DashMap;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Errors a shared store can report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// Store could not be reached
    #[error("shared store unavailable: {0}")]
    Unavailable(String),

    /// Operation did not finish in time
    #[error("shared store timed out")]
    Timeout,

    /// Store-side failure
    #[error("shared store error: {0}")]
    Backend(String),
}

/// Key-value store shared between retriever instances
///
/// Implementations own their consistency and expiry. The trait is
/// object-safe for use as `Arc<dyn SharedStore>`.
pub trait SharedStore: Send + Sync {
    /// Live value for `key`
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key` for `ttl`
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError>;

    /// Remove `key`
    fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Name for debugging and logging
    fn name(&self) -> &str {
        "shared"
    }
}

/// DashMap-backed store with TTL, usable as a shared tier inside one process
#[derive(Debug, Default)]
pub struct InMemorySharedStore {
    entries: DashMap<String, (String, Instant)>,
}

impl InMemorySharedStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries held, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SharedStore for InMemorySharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if entry.1 > now => return Ok(Some(entry.0.clone())),
            Some(_) => {}
            None => return Ok(None),
        }
        // Read guard is released; drop the entry unless a writer refreshed it
        self.entries.remove_if(key, |_, (_, expires)| *expires <= now);
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}
