//! BM25 lexical scoring over the inverted index
//!
//! # BM25 Formula
//!
//! For each distinct query term t:
//! score += IDF(t) * (tf * (k1 + 1)) / (tf + k1 * (1 - b + b * dl/avgdl))
//!
//! Where:
//! - tf = term frequency in document
//! - dl = document length
//! - avgdl = average document length
//! - k1 = term saturation parameter (default 1.4)
//! - b = length normalization parameter (default 0.6)
//! - IDF(t) = max(ln((N - df + 0.5) / (df + 0.5)), IDF_FLOOR)

use crate::scorer::{sort_scored, Scorer};
use rustc_hash::FxHashMap;
use sift_core::{Bm25Config, DocId, Query};
use sift_index::{CorpusSnapshot, InvertedIndex};

/// Lower bound for IDF; keeps terms present in most documents contributing
/// a small positive amount so scores stay monotone in term frequency.
pub const IDF_FLOOR: f32 = 0.01;

/// Index-backed BM25 scorer
#[derive(Debug, Clone)]
pub struct Bm25Scorer {
    /// k1 parameter: term frequency saturation
    k1: f32,
    /// b parameter: length normalization
    b: f32,
}

impl Default for Bm25Scorer {
    fn default() -> Self {
        Bm25Scorer { k1: 1.4, b: 0.6 }
    }
}

impl Bm25Scorer {
    /// Create a new Bm25Scorer with custom parameters
    pub fn new(k1: f32, b: f32) -> Self {
        Bm25Scorer { k1, b }
    }

    /// Create from configuration
    pub fn from_config(cfg: &Bm25Config) -> Self {
        Self::new(cfg.k1, cfg.b)
    }

    /// k1 parameter
    pub fn k1(&self) -> f32 {
        self.k1
    }

    /// b parameter
    pub fn b(&self) -> f32 {
        self.b
    }

    /// Floored IDF for a term
    pub fn idf(&self, index: &InvertedIndex, term: &str) -> f32 {
        index.compute_idf(term).max(IDF_FLOOR)
    }
}

impl Scorer for Bm25Scorer {
    fn score(&self, query: &Query, snapshot: &CorpusSnapshot) -> Vec<(DocId, f32)> {
        if query.is_empty() || snapshot.is_empty() {
            return Vec::new();
        }

        let index = snapshot.index();
        let avg_len = index.avg_doc_len().max(1.0);
        let mut scores: FxHashMap<DocId, f32> = FxHashMap::default();

        for term in query.unique_tokens() {
            let Some(postings) = index.lookup(term) else {
                continue;
            };
            let idf = self.idf(index, term);

            for entry in &postings.entries {
                let tf = entry.tf as f32;
                let doc_len = index.doc_len(entry.doc_id).unwrap_or(0) as f32;
                let tf_component = (tf * (self.k1 + 1.0))
                    / (tf + self.k1 * (1.0 - self.b + self.b * doc_len / avg_len));
                *scores.entry(entry.doc_id).or_insert(0.0) += idf * tf_component;
            }
        }

        let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
        sort_scored(&mut scored);
        scored
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
