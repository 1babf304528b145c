//! Per-call scoring state for one document

use crate::document::DocId;
use serde::Serialize;

/// A document under consideration during one retrieval call
///
/// Never persisted. `fused_score` is derived only from the two component
/// scores; `gate_score` is filled by the reranker and `selected` by the
/// diversity selector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Referenced document in the current snapshot
    pub doc_id: DocId,
    /// BM25 score (0.0 when the document had no term overlap)
    pub lexical_score: f32,
    /// Heuristic score (0.0 when no rule fired)
    pub semantic_score: f32,
    /// Weighted combination of the two
    pub fused_score: f32,
    /// Reranker estimate in [0, 1], when gating ran
    pub gate_score: Option<f32>,
    /// Picked by the diversity selector
    pub selected: bool,
}

impl Candidate {
    /// Create an unscored candidate
    pub fn new(doc_id: DocId) -> Self {
        Candidate {
            doc_id,
            lexical_score: 0.0,
            semantic_score: 0.0,
            fused_score: 0.0,
            gate_score: None,
            selected: false,
        }
    }

    /// Builder: set component scores and the fused result
    pub fn with_scores(mut self, lexical: f32, semantic: f32, fused: f32) -> Self {
        self.lexical_score = lexical;
        self.semantic_score = semantic;
        self.fused_score = fused;
        self
    }

    /// Builder: set the gate score
    pub fn with_gate(mut self, gate: f32) -> Self {
        self.gate_score = Some(gate);
        self
    }
}
