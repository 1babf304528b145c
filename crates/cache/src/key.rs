//! Cache key construction

use sift_core::normalize;

/// Default cap on the normalized query inside a key, in characters
pub const DEFAULT_MAX_KEY_CHARS: usize = 200;

/// Key for a query against one corpus version.
///
/// The query is normalized (lowercased, punctuation stripped, whitespace
/// collapsed) and capped at [`DEFAULT_MAX_KEY_CHARS`]. `scope` separates
/// otherwise identical requests, e.g. different result counts.
///
/// # Example
///
/// ```
/// use sift_cache::cache_key;
///
/// assert_eq!(cache_key("  Copper STILL? ", 3, "n5"), cache_key("copper still", 3, "n5"));
/// assert_ne!(cache_key("copper still", 3, "n5"), cache_key("copper still", 4, "n5"));
/// ```
pub fn cache_key(query: &str, version: u64, scope: &str) -> String {
    cache_key_with_limit(query, version, scope, DEFAULT_MAX_KEY_CHARS)
}

/// [`cache_key`] with an explicit query length cap
pub fn cache_key_with_limit(query: &str, version: u64, scope: &str, max_chars: usize) -> String {
    format!("v{}|{}|{}", version, scope, normalized_query(query, max_chars))
}

/// Normalized query truncated to `max_chars` characters
pub fn normalized_query(query: &str, max_chars: usize) -> String {
    let normalized = normalize(query);
    match normalized.char_indices().nth(max_chars) {
        Some((idx, _)) => normalized[..idx].trim_end().to_string(),
        None => normalized,
    }
}
