//! Sift - prompt-context retrieval core
//!
//! Sift picks the few corpus snippets most relevant to a natural-language
//! query and renders them as a size-bounded text block for a language-model
//! prompt.
//!
//! # Quick Start
//!
//! ```
//! use sift::{RawEntry, Retriever};
//!
//! let retriever = Retriever::new();
//! let corpus = retriever.rebuild_index(&[
//!     RawEntry::text("10 Gallon Copper Distiller\n220V electric.\nPrice: $899"),
//!     RawEntry::text("Silicone Gasket Set\nFood grade seals.\nPrice: $12"),
//! ]);
//!
//! let text = retriever.retrieve("10 gallon distiller price", &corpus, 3)?;
//! assert!(text.starts_with("[1] 10 Gallon Copper Distiller"));
//! # Ok::<(), sift::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `sift-core`: data model, tokenizer, errors, configuration
//! - `sift-index`: entry parsers, inverted index, corpus snapshots
//! - `sift-rank`: BM25, semantic heuristics, fusion, gating, MMR, formatting
//! - `sift-cache`: memory and shared result cache tiers
//!
//! The [`Retriever`] ties the stages together. Only the types a caller needs
//! to drive it, or to plug in a collaborator, are re-exported here.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod retriever;

pub use retriever::{
    CacheOutcome, Retrieval, RetrievalTrace, RetrieveOptions, Retriever, RetrieverBuilder,
};

pub use sift_cache::{CacheStats, CacheTier, InMemorySharedStore, SharedStore, StoreError};
pub use sift_core::{
    Candidate, DocId, Document, EntryKind, Error, Query, RawEntry, Result, SiftConfig,
    CONFIG_FILE_NAME, MAX_RESULTS,
};
pub use sift_index::{CorpusHandle, CorpusSnapshot, ParseStats};
pub use sift_rank::{EstimateError, HeuristicEstimator, RelevanceEstimator};
