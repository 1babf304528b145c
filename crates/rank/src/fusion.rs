//! Fusion of lexical and semantic result lists
//!
//! A fused score depends only on the candidate's own component scores, so
//! adding unrelated documents to either list never reorders the others.

use sift_core::{Candidate, DocId, FusionConfig};
use sift_index::CorpusSnapshot;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

/// Pluggable fusion interface
///
/// # Thread Safety
///
/// Fusers must be Send + Sync for concurrent retrieval calls.
pub trait Fuser: Send + Sync {
    /// Fuse the two scored lists into one candidate list, best first
    fn fuse(
        &self,
        lexical: &[(DocId, f32)],
        semantic: &[(DocId, f32)],
        snapshot: &CorpusSnapshot,
    ) -> Vec<Candidate>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Weighted sum for documents in both lists, raw score otherwise
///
/// Ordering: fused score descending, then base relevance descending, then
/// DocId ascending.
#[derive(Debug, Clone)]
pub struct WeightedFuser {
    lexical_weight: f32,
    semantic_weight: f32,
}

impl Default for WeightedFuser {
    fn default() -> Self {
        WeightedFuser {
            lexical_weight: 0.6,
            semantic_weight: 0.4,
        }
    }
}

impl WeightedFuser {
    /// Create with explicit weights
    pub fn new(lexical_weight: f32, semantic_weight: f32) -> Self {
        WeightedFuser {
            lexical_weight,
            semantic_weight,
        }
    }

    /// Create from configuration
    pub fn from_config(cfg: &FusionConfig) -> Self {
        Self::new(cfg.lexical_weight, cfg.semantic_weight)
    }

    fn combine(&self, lexical: Option<f32>, semantic: Option<f32>) -> f32 {
        match (lexical, semantic) {
            (Some(l), Some(s)) => self.lexical_weight * l + self.semantic_weight * s,
            (Some(l), None) => l,
            (None, Some(s)) => s,
            (None, None) => 0.0,
        }
    }
}

impl Fuser for WeightedFuser {
    fn fuse(
        &self,
        lexical: &[(DocId, f32)],
        semantic: &[(DocId, f32)],
        snapshot: &CorpusSnapshot,
    ) -> Vec<Candidate> {
        let mut parts: BTreeMap<DocId, (Option<f32>, Option<f32>)> = BTreeMap::new();
        for &(id, score) in lexical {
            parts.entry(id).or_default().0 = Some(score);
        }
        for &(id, score) in semantic {
            parts.entry(id).or_default().1 = Some(score);
        }

        let total = parts.len();
        let mut candidates: Vec<Candidate> = parts
            .into_iter()
            .filter(|(id, _)| snapshot.contains(*id))
            .map(|(id, (l, s))| {
                Candidate::new(id).with_scores(
                    l.unwrap_or(0.0),
                    s.unwrap_or(0.0),
                    self.combine(l, s),
                )
            })
            .collect();

        let stale = total - candidates.len();
        if stale > 0 {
            debug!(stale, version = snapshot.version(), "Dropped ids missing from snapshot");
        }

        sort_by_fused(&mut candidates, snapshot);
        candidates
    }

    fn name(&self) -> &str {
        "weighted"
    }
}

/// Sort by fused score desc, base relevance desc, DocId asc
pub fn sort_by_fused(candidates: &mut [Candidate], snapshot: &CorpusSnapshot) {
    candidates.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| cmp_base_relevance(a, b, snapshot))
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
}

/// Compare by base relevance, higher first
pub(crate) fn cmp_base_relevance(
    a: &Candidate,
    b: &Candidate,
    snapshot: &CorpusSnapshot,
) -> Ordering {
    let base = |c: &Candidate| {
        snapshot
            .document(c.doc_id)
            .map(|d| d.base_relevance)
            .unwrap_or(0.0)
    };
    base(b).partial_cmp(&base(a)).unwrap_or(Ordering::Equal)
}
