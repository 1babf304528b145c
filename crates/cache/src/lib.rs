//! Result caching for sift
//!
//! This crate provides:
//! - cache_key: normalized, version-scoped keys
//! - MemoryTier: bounded in-process LRU with TTL and batch eviction
//! - SharedStore: optional cross-process tier, with a DashMap reference store
//! - TieredCache: memory-then-shared lookups with promotion and
//!   generation-based invalidation
//!
//! Shared-tier failures never surface to callers; they are logged, counted,
//! and treated as misses.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod key;
pub mod memory;
pub mod shared;
pub mod tiered;

pub use key::{cache_key, cache_key_with_limit, normalized_query, DEFAULT_MAX_KEY_CHARS};
pub use memory::{CacheEntry, MemoryTier};
pub use shared::{InMemorySharedStore, SharedStore, StoreError};
pub use tiered::{CacheStats, CacheTier, TieredCache};
