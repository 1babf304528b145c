//! Ranking stages for sift
//!
//! This crate provides:
//! - Scorer trait with BM25 and heuristic semantic implementations
//! - Fuser trait with weighted score fusion
//! - RelevanceEstimator / Reranker / gate for relevance gating
//! - DiversitySelector (MMR) for final selection
//! - ResultFormatter for the bounded text block
//!
//! Stages are pure functions of the query, the candidates, and an immutable
//! `CorpusSnapshot`; the root `sift` crate wires them into a pipeline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bm25;
pub mod format;
pub mod fusion;
pub mod gate;
pub mod mmr;
pub mod scorer;
pub mod semantic;

pub use bm25::{Bm25Scorer, IDF_FLOOR};
pub use format::ResultFormatter;
pub use fusion::{sort_by_fused, Fuser, WeightedFuser};
pub use gate::{gate, EstimateError, HeuristicEstimator, RelevanceEstimator, Reranker};
pub use mmr::{jaccard, DiversitySelector};
pub use scorer::{sort_scored, Scorer};
pub use semantic::{has_price_intent, has_stock_intent, SemanticScorer};
