//! Document indexing for sift
//!
//! This crate provides:
//! - EntryParser adapters (text blocks, catalog records with variants)
//! - InvertedIndex with posting lists and corpus statistics
//! - CorpusSnapshot / SnapshotCell for versioned, atomically swapped corpora
//!
//! # Usage
//!
//! ```
//! use sift_core::{IndexConfig, RawEntry};
//! use sift_index::SnapshotCell;
//!
//! let cell = SnapshotCell::new();
//! let snapshot = cell.publish(
//!     &[RawEntry::text("Copper Pot Still\nPrice: $499")],
//!     &IndexConfig::default(),
//! );
//! assert_eq!(snapshot.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod index;
pub mod parser;
pub mod snapshot;

pub use index::{InvertedIndex, PostingEntry, PostingList};
pub use parser::{
    parser_for, CatalogEntryParser, EntryParser, ParseOutcome, ParsedDocument, SkipReason,
    TextEntryParser,
};
pub use snapshot::{
    build_index, corpus_fingerprint, CorpusHandle, CorpusSnapshot, ParseStats, SnapshotCell,
};
