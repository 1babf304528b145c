//! Corpus snapshots and atomic publication
//!
//! This module provides:
//! - build_index: RawEntry list -> documents + inverted index + parse stats
//! - CorpusSnapshot: immutable, versioned view of one corpus
//! - corpus_fingerprint: content hash identifying a corpus across processes
//! - SnapshotCell: owner of the current snapshot, swapped atomically
//!
//! # Concurrency
//!
//! Readers clone the `Arc` out of the cell and keep using it for the whole
//! call. A rebuild constructs the next snapshot without holding the lock and
//! then swaps the pointer, so in-flight reads keep their old snapshot.

use crate::index::InvertedIndex;
use crate::parser::{parser_for, ParseOutcome, ParsedDocument, SkipReason};
use parking_lot::RwLock;
use sift_core::{
    Availability, Category, DocId, Document, EntryKind, IndexConfig, RawEntry, StructuredFields,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use xxhash_rust::xxh3::Xxh3;

/// Shared handle to a published snapshot
pub type CorpusHandle = Arc<CorpusSnapshot>;

// ============================================================================
// ParseStats
// ============================================================================

/// Counters collected while building a snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Raw entries handed to the indexer
    pub entries_seen: usize,
    /// Documents produced
    pub documents_emitted: usize,
    /// Entries without a usable title
    pub skipped_empty_title: usize,
    /// Entries recognized as blog/navigation/site chrome
    pub skipped_non_product: usize,
    /// Extra documents produced by catalog variant expansion
    pub variants_expanded: usize,
}

impl ParseStats {
    /// Total skipped entries
    pub fn skipped(&self) -> usize {
        self.skipped_empty_title + self.skipped_non_product
    }
}

// ============================================================================
// build_index
// ============================================================================

/// Parse a corpus into documents and build its inverted index.
///
/// Deterministic for a given input order: DocIds are assigned in the order
/// documents are produced.
pub fn build_index(
    corpus: &[RawEntry],
    cfg: &IndexConfig,
) -> (Vec<Document>, InvertedIndex, ParseStats) {
    let mut stats = ParseStats {
        entries_seen: corpus.len(),
        ..ParseStats::default()
    };
    let mut documents: Vec<Document> = Vec::new();

    for (position, entry) in corpus.iter().enumerate() {
        let parser = parser_for(entry.kind);
        match parser.parse(entry, cfg) {
            ParseOutcome::Documents(parsed) => {
                stats.variants_expanded += parsed.len().saturating_sub(1);
                for p in parsed {
                    let id = DocId(documents.len() as u32);
                    documents.push(into_document(id, p, cfg));
                }
            }
            ParseOutcome::Skipped(reason) => {
                debug!(position, parser = parser.name(), ?reason, "Skipping corpus entry");
                match reason {
                    SkipReason::EmptyTitle => stats.skipped_empty_title += 1,
                    SkipReason::NonProduct => stats.skipped_non_product += 1,
                }
            }
        }
    }

    stats.documents_emitted = documents.len();
    let index = InvertedIndex::build(&documents);
    (documents, index, stats)
}

fn into_document(id: DocId, p: ParsedDocument, cfg: &IndexConfig) -> Document {
    let fields = StructuredFields {
        price: p.price,
        capacity_gallons: p.capacity_gallons,
        features: p.features,
        category: p.category,
        availability: p.availability,
    };

    let mut searchable = format!("{} {}", p.title, p.description);
    for feature in &fields.features {
        searchable.push(' ');
        searchable.push_str(feature.label());
    }
    searchable.push(' ');
    searchable.push_str(fields.category.label());
    if let Some(price) = fields.price {
        searchable.push(' ');
        searchable.push_str(&price.to_string());
    }

    Document {
        id,
        base_relevance: base_relevance(&fields, cfg),
        searchable_text: searchable.to_lowercase(),
        title: p.title,
        raw_text: p.description,
        fields,
    }
}

/// Static prior: stock status, headline categories, capacity near the sweet spot
fn base_relevance(fields: &StructuredFields, cfg: &IndexConfig) -> f32 {
    let mut prior = 1.0;
    prior += match fields.availability {
        Availability::InStock => 0.3,
        Availability::Backorder => -0.1,
        Availability::OutOfStock => -0.3,
        Availability::Unknown => 0.0,
    };
    if matches!(fields.category, Category::Distiller | Category::Kit) {
        prior += 0.2;
    }
    if let Some(capacity) = fields.capacity_gallons {
        let sweet = cfg.capacity_sweet_spot_gallons.max(f32::EPSILON);
        let closeness = 1.0 - ((capacity - sweet).abs() / sweet);
        prior += 0.2 * closeness.max(0.0);
    }
    prior
}

// ============================================================================
// corpus_fingerprint
// ============================================================================

/// xxh3 hash of the corpus content and the parsing limits.
///
/// Equal for equal input in any process, so it can namespace entries in a
/// store shared between processes. Depends on entry order, since DocIds do.
pub fn corpus_fingerprint(corpus: &[RawEntry], cfg: &IndexConfig) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(&(corpus.len() as u64).to_le_bytes());
    for entry in corpus {
        let kind: u8 = match entry.kind {
            EntryKind::Text => 0,
            EntryKind::Catalog => 1,
        };
        hasher.update(&[kind]);
        // Length prefix keeps entry boundaries unambiguous
        hasher.update(&(entry.body.len() as u64).to_le_bytes());
        hasher.update(entry.body.as_bytes());
    }
    hasher.update(&(cfg.description_cap as u64).to_le_bytes());
    hasher.update(&(cfg.metadata_window as u64).to_le_bytes());
    hasher.update(&cfg.capacity_sweet_spot_gallons.to_bits().to_le_bytes());
    hasher.digest()
}

// ============================================================================
// CorpusSnapshot
// ============================================================================

/// Immutable, versioned view of an indexed corpus
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    version: u64,
    fingerprint: u64,
    documents: Vec<Document>,
    index: InvertedIndex,
    parse_stats: ParseStats,
}

impl CorpusSnapshot {
    /// The empty snapshot (version 0, fingerprint 0)
    pub fn empty() -> Self {
        CorpusSnapshot {
            version: 0,
            fingerprint: 0,
            documents: Vec::new(),
            index: InvertedIndex::default(),
            parse_stats: ParseStats::default(),
        }
    }

    /// Build a snapshot with an explicit version
    pub fn build(version: u64, corpus: &[RawEntry], cfg: &IndexConfig) -> Self {
        let (documents, index, parse_stats) = build_index(corpus, cfg);
        CorpusSnapshot {
            version,
            fingerprint: corpus_fingerprint(corpus, cfg),
            documents,
            index,
            parse_stats,
        }
    }

    /// Corpus version marker, local to the publishing [`SnapshotCell`]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Content fingerprint, see [`corpus_fingerprint`]
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// Look up a document; `None` for ids from another snapshot
    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id.index())
    }

    /// Whether `id` refers to a document of this snapshot
    pub fn contains(&self, id: DocId) -> bool {
        id.index() < self.documents.len()
    }

    /// All documents in id order
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The inverted index
    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// Counters from the build
    pub fn parse_stats(&self) -> ParseStats {
        self.parse_stats
    }

    /// Number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True for a snapshot without documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

// ============================================================================
// SnapshotCell
// ============================================================================

/// Owner of the currently published snapshot
pub struct SnapshotCell {
    current: RwLock<CorpusHandle>,
    next_version: AtomicU64,
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotCell {
    /// Create a cell holding the empty snapshot
    pub fn new() -> Self {
        SnapshotCell {
            current: RwLock::new(Arc::new(CorpusSnapshot::empty())),
            next_version: AtomicU64::new(1),
        }
    }

    /// Current snapshot; cheap `Arc` clone
    pub fn current(&self) -> CorpusHandle {
        self.current.read().clone()
    }

    /// Version of the current snapshot
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    /// Build a new snapshot from `corpus` and publish it.
    ///
    /// The build runs without holding the lock; only the pointer swap is
    /// exclusive.
    pub fn publish(&self, corpus: &[RawEntry], cfg: &IndexConfig) -> CorpusHandle {
        let started = Instant::now();
        let version = self.next_version.fetch_add(1, Ordering::AcqRel);
        let snapshot = Arc::new(CorpusSnapshot::build(version, corpus, cfg));
        let stats = snapshot.parse_stats();

        {
            let mut current = self.current.write();
            // A slower concurrent rebuild must not overwrite a newer snapshot
            if current.version() < version {
                *current = Arc::clone(&snapshot);
            }
        }

        info!(
            version,
            fingerprint = %format_args!("{:016x}", snapshot.fingerprint()),
            documents = snapshot.len(),
            skipped = stats.skipped(),
            variants = stats.variants_expanded,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Published corpus snapshot"
        );
        snapshot
    }
}
