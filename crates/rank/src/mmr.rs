//! Maximal Marginal Relevance selection
//!
//! Greedy selection that balances relevance against redundancy:
//!
//! ```text
//! mmr(c) = λ · relevance(c) − (1 − λ) · max_{s ∈ selected} sim(c, s)
//! ```
//!
//! Relevance is the fused score divided by the pool's best fused score,
//! blended with the gate score when one is present. Similarity is the
//! Jaccard overlap of the two documents' indexed term sets.

use rustc_hash::FxHashSet;
use sift_core::{Candidate, DiversityConfig, DocId};
use sift_index::CorpusSnapshot;

/// Diversity-aware selector
#[derive(Debug, Clone)]
pub struct DiversitySelector {
    lambda: f32,
    gate_blend: f32,
}

impl Default for DiversitySelector {
    fn default() -> Self {
        DiversitySelector {
            lambda: 0.7,
            gate_blend: 0.5,
        }
    }
}

impl DiversitySelector {
    /// Create with an explicit trade-off.
    ///
    /// `lambda = 1.0` is pure relevance; `gate_blend` is the share of the
    /// gate score in a candidate's relevance.
    pub fn new(lambda: f32, gate_blend: f32) -> Self {
        DiversitySelector {
            lambda: lambda.clamp(0.0, 1.0),
            gate_blend: gate_blend.clamp(0.0, 1.0),
        }
    }

    /// Create from configuration
    pub fn from_config(cfg: &DiversityConfig) -> Self {
        Self::new(cfg.lambda, cfg.gate_blend)
    }

    /// Pick up to `n` candidates from `pool`.
    ///
    /// The pool order decides ties: of two candidates with equal MMR value
    /// the earlier one wins. Ids missing from `snapshot` and repeated ids are
    /// skipped. Returned candidates have `selected` set.
    pub fn select(
        &self,
        pool: Vec<Candidate>,
        snapshot: &CorpusSnapshot,
        n: usize,
    ) -> Vec<Candidate> {
        let mut seen: FxHashSet<DocId> = FxHashSet::default();
        let mut remaining: Vec<Candidate> = pool
            .into_iter()
            .filter(|c| snapshot.contains(c.doc_id) && seen.insert(c.doc_id))
            .collect();
        if remaining.is_empty() || n == 0 {
            return Vec::new();
        }

        let max_fused = remaining
            .iter()
            .map(|c| c.fused_score)
            .fold(f32::NEG_INFINITY, f32::max);
        let relevance: Vec<f32> = remaining
            .iter()
            .map(|c| self.relevance(c, max_fused))
            .collect();
        let terms: Vec<FxHashSet<&str>> = remaining
            .iter()
            .map(|c| term_set(snapshot, c.doc_id))
            .collect();

        let mut order: Vec<usize> = (0..remaining.len()).collect();
        let mut picked: Vec<usize> = Vec::with_capacity(n.min(remaining.len()));

        while picked.len() < n && !order.is_empty() {
            let mut best_pos = 0;
            let mut best_value = f32::NEG_INFINITY;
            for (pos, &i) in order.iter().enumerate() {
                let redundancy = picked
                    .iter()
                    .map(|&j| jaccard(&terms[i], &terms[j]))
                    .fold(0.0, f32::max);
                let value = self.lambda * relevance[i] - (1.0 - self.lambda) * redundancy;
                if value > best_value {
                    best_value = value;
                    best_pos = pos;
                }
            }
            picked.push(order.remove(best_pos));
        }

        let mut slots: Vec<Option<Candidate>> = remaining.drain(..).map(Some).collect();
        picked
            .into_iter()
            .filter_map(|i| slots[i].take())
            .map(|mut c| {
                c.selected = true;
                c
            })
            .collect()
    }

    fn relevance(&self, candidate: &Candidate, max_fused: f32) -> f32 {
        let fused = if max_fused > 0.0 {
            (candidate.fused_score / max_fused).max(0.0)
        } else {
            0.0
        };
        match candidate.gate_score {
            Some(gate) => (1.0 - self.gate_blend) * fused + self.gate_blend * gate,
            None => fused,
        }
    }
}

fn term_set(snapshot: &CorpusSnapshot, id: DocId) -> FxHashSet<&str> {
    snapshot
        .index()
        .term_freqs(id)
        .map(|tf| tf.keys().map(String::as_str).collect())
        .unwrap_or_default()
}

/// Jaccard overlap; 0.0 when both sets are empty
pub fn jaccard(a: &FxHashSet<&str>, b: &FxHashSet<&str>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}
