//! Core types and traits for sift
//!
//! This crate defines the foundational types used throughout the retrieval
//! pipeline:
//! - RawEntry / EntryKind: corpus entries as supplied by the corpus source
//! - Document / StructuredFields: normalized, immutable indexed records
//! - Query: tokenized per-request query
//! - Candidate: per-call scoring state
//! - Error / Result: the error type hierarchy
//! - SiftConfig: tunable constants loaded from `sift.toml`
//! - tokenizer: the single tokenizer shared by indexing and scoring

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod tokenizer;

pub use candidate::Candidate;
pub use config::{
    Bm25Config, CacheConfig, DiversityConfig, FormatConfig, FusionConfig, GateConfig,
    IndexConfig, SemanticConfig, SiftConfig, CONFIG_FILE_NAME,
};
pub use document::{
    Availability, Category, DocId, Document, EntryKind, Feature, Price, RawEntry,
    StructuredFields,
};
pub use error::{Error, Result};
pub use query::Query;
pub use tokenizer::{contains_phrase, normalize, tokenize, tokenize_unique};

/// Upper bound on `max_results` accepted by the retrieval entry points
pub const MAX_RESULTS: usize = 50;
