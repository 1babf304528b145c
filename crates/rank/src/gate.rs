//! Relevance gating for fused candidates
//!
//! After fusion produces the pool, a relevance estimator rescores the top
//! candidates jointly against the query. Candidates whose estimate falls
//! below the threshold are dropped before diversity selection:
//!
//! ```text
//! fused candidates → top_k → estimator per (query, document)
//!     → gate_score → threshold filter → diversity selection
//! ```
//!
//! An estimator failure aborts the whole rerank; the caller decides how to
//! degrade (the retriever skips gating for that request).

use crate::fusion::{cmp_base_relevance, sort_by_fused};
use crate::semantic::{PRICE_INTENT, STOCK_INTENT};
use rustc_hash::FxHashSet;
use sift_core::{contains_phrase, normalize, tokenize, Availability, Candidate, Document, Query};
use sift_index::parser::extract_capacity;
use sift_index::CorpusSnapshot;
use std::cmp::Ordering;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors an estimator can report
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimateError {
    /// Backing model or service unreachable
    #[error("estimator unavailable: {0}")]
    Unavailable(String),

    /// Estimate not produced in time
    #[error("estimator timed out")]
    Timeout,

    /// Estimate was not a finite number
    #[error("invalid estimate: {0}")]
    Invalid(String),
}

/// Joint (query, document) relevance estimator
///
/// Scores are expected in `[0.0, 1.0]`; out-of-range values are clamped by
/// the [`Reranker`]. The trait is object-safe for use as
/// `Arc<dyn RelevanceEstimator>`.
pub trait RelevanceEstimator: Send + Sync {
    /// Estimate how well `document` answers `query`
    fn estimate(&self, query: &Query, document: &Document) -> Result<f32, EstimateError>;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

// ============================================================================
// HeuristicEstimator
// ============================================================================

/// Built-in estimator combining term coverage, title coverage, and phrase
/// adjacency, with a penalty when the query names a different capacity.
#[derive(Debug, Clone)]
pub struct HeuristicEstimator {
    /// Weight of query-term coverage over the whole document
    pub coverage_weight: f32,
    /// Weight of content-term coverage over the title
    pub title_weight: f32,
    /// Weight of adjacent query pairs found as phrases
    pub phrase_weight: f32,
    /// Subtracted when query and document capacities disagree
    pub capacity_penalty: f32,
}

impl Default for HeuristicEstimator {
    fn default() -> Self {
        HeuristicEstimator {
            coverage_weight: 0.6,
            title_weight: 0.25,
            phrase_weight: 0.15,
            capacity_penalty: 0.15,
        }
    }
}

/// Shortest token allowed to match by prefix
const PREFIX_MIN_CHARS: usize = 4;

/// Capacity difference, in gallons, tolerated before the mismatch penalty
const CAPACITY_MISMATCH_GALLONS: f32 = 0.5;

fn is_price_token(token: &str) -> bool {
    PRICE_INTENT.contains(&token)
}

fn is_stock_token(token: &str) -> bool {
    STOCK_INTENT.contains(&token)
}

fn term_matches(terms: &FxHashSet<String>, token: &str) -> bool {
    if terms.contains(token) {
        return true;
    }
    token.chars().count() >= PREFIX_MIN_CHARS
        && terms.iter().any(|t| {
            t.chars().count() >= PREFIX_MIN_CHARS
                && (t.starts_with(token) || token.starts_with(t.as_str()))
        })
}

impl HeuristicEstimator {
    fn intent_satisfied(token: &str, doc: &Document) -> bool {
        if is_price_token(token) {
            doc.has_price()
        } else {
            doc.fields.availability != Availability::Unknown
        }
    }
}

impl RelevanceEstimator for HeuristicEstimator {
    fn estimate(&self, query: &Query, doc: &Document) -> Result<f32, EstimateError> {
        let tokens = query.unique_tokens();
        if tokens.is_empty() {
            return Ok(0.0);
        }

        let (intents, content): (Vec<&str>, Vec<&str>) = tokens
            .iter()
            .copied()
            .partition(|t| is_price_token(t) || is_stock_token(t));

        let doc_terms: FxHashSet<String> = tokenize(&doc.searchable_text).into_iter().collect();
        let title_terms: FxHashSet<String> = tokenize(&doc.title).into_iter().collect();

        let matched = content.iter().filter(|t| term_matches(&doc_terms, t)).count()
            + intents
                .iter()
                .filter(|t| Self::intent_satisfied(t, doc))
                .count();
        let coverage = matched as f32 / tokens.len() as f32;

        let title_coverage = if content.is_empty() {
            0.0
        } else {
            content.iter().filter(|t| term_matches(&title_terms, t)).count() as f32
                / content.len() as f32
        };

        // Adjacent content tokens, in query order
        let ordered: Vec<&str> = query
            .tokens
            .iter()
            .map(String::as_str)
            .filter(|t| content.contains(t))
            .collect();
        let pairs: Vec<String> = ordered
            .windows(2)
            .filter(|w| w[0] != w[1])
            .map(|w| format!("{} {}", w[0], w[1]))
            .collect();
        let phrase = if pairs.is_empty() {
            title_coverage
        } else {
            let text = normalize(&format!("{} {}", doc.title, doc.raw_text));
            pairs.iter().filter(|p| contains_phrase(&text, p)).count() as f32 / pairs.len() as f32
        };

        let mut score = self.coverage_weight * coverage
            + self.title_weight * title_coverage
            + self.phrase_weight * phrase;

        let capacity = (extract_capacity(&query.raw), doc.fields.capacity_gallons);
        if let (Some(wanted), Some(have)) = capacity {
            if (wanted - have).abs() > CAPACITY_MISMATCH_GALLONS {
                score -= self.capacity_penalty;
            }
        }

        Ok(score.clamp(0.0, 1.0))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

// ============================================================================
// Reranker
// ============================================================================

/// Applies an estimator to the top fused candidates
#[derive(Clone)]
pub struct Reranker {
    estimator: Arc<dyn RelevanceEstimator>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("estimator", &self.estimator.name())
            .finish()
    }
}

impl Default for Reranker {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicEstimator::default()))
    }
}

impl Reranker {
    /// Wrap an estimator
    pub fn new(estimator: Arc<dyn RelevanceEstimator>) -> Self {
        Reranker { estimator }
    }

    /// Name of the wrapped estimator
    pub fn estimator_name(&self) -> &str {
        self.estimator.name()
    }

    /// Score the `top_k` best fused candidates.
    ///
    /// Returns them in fused order with `gate_score` set. Candidates whose
    /// document is missing from `snapshot` are dropped. The first estimator
    /// error aborts the call.
    pub fn rerank(
        &self,
        query: &Query,
        mut candidates: Vec<Candidate>,
        top_k: usize,
        snapshot: &CorpusSnapshot,
    ) -> Result<Vec<Candidate>, EstimateError> {
        sort_by_fused(&mut candidates, snapshot);
        candidates.truncate(top_k);

        let mut scored = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let Some(doc) = snapshot.document(candidate.doc_id) else {
                continue;
            };
            let estimate = self.estimator.estimate(query, doc)?;
            if !estimate.is_finite() {
                return Err(EstimateError::Invalid(format!(
                    "{} returned {estimate} for {}",
                    self.estimator.name(),
                    candidate.doc_id
                )));
            }
            scored.push(candidate.with_gate(estimate.clamp(0.0, 1.0)));
        }

        debug!(
            estimator = self.estimator.name(),
            scored = scored.len(),
            "Reranked candidates"
        );
        Ok(scored)
    }
}

/// Keep candidates whose gate score reaches `threshold`.
///
/// Output is ordered by gate score desc, fused score desc, base relevance
/// desc, DocId asc. Candidates without a gate score are dropped.
pub fn gate(
    candidates: Vec<Candidate>,
    threshold: f32,
    snapshot: &CorpusSnapshot,
) -> Vec<Candidate> {
    let mut kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.gate_score.is_some_and(|g| g >= threshold))
        .collect();

    kept.sort_by(|a, b| {
        let ga = a.gate_score.unwrap_or(0.0);
        let gb = b.gate_score.unwrap_or(0.0);
        gb.partial_cmp(&ga)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                b.fused_score
                    .partial_cmp(&a.fused_score)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| cmp_base_relevance(a, b, snapshot))
            .then_with(|| a.doc_id.cmp(&b.doc_id))
    });
    kept
}
