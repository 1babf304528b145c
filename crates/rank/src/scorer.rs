//! Scorer trait shared by the lexical and heuristic scorers

use sift_core::{DocId, Query};
use sift_index::CorpusSnapshot;
use std::cmp::Ordering;

/// Pluggable first-stage scoring interface
///
/// Scorers return `(DocId, score)` pairs for documents they consider
/// relevant, omitting documents that scored nothing at all. Scores are not
/// normalized; fusion handles cross-scorer comparisons.
///
/// # Thread Safety
///
/// Scorers must be Send + Sync for concurrent retrieval calls.
pub trait Scorer: Send + Sync {
    /// Score the snapshot's documents against a query
    fn score(&self, query: &Query, snapshot: &CorpusSnapshot) -> Vec<(DocId, f32)>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Sort scored pairs by score descending, then DocId ascending
pub fn sort_scored(scored: &mut [(DocId, f32)]) {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
}
