//! Inverted index for BM25 scoring
//!
//! This module provides:
//! - PostingEntry / PostingList: per-term document frequencies
//! - InvertedIndex: postings, document frequencies, per-document term maps,
//!   and document lengths for one corpus version
//!
//! The index is built once from a finished document list and never mutated
//! afterwards; a changed corpus gets a new index inside a new snapshot.

use rustc_hash::FxHashMap;
use sift_core::tokenizer::tokenize;
use sift_core::{DocId, Document};

// ============================================================================
// PostingEntry
// ============================================================================

/// Entry in a posting list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostingEntry {
    /// Document containing the term
    pub doc_id: DocId,
    /// Term frequency in this document
    pub tf: u32,
}

// ============================================================================
// PostingList
// ============================================================================

/// Documents containing a term, in ascending DocId order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingList {
    /// Document entries
    pub entries: Vec<PostingEntry>,
}

impl PostingList {
    /// Number of documents containing this term
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if posting list is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Term frequency for one document, if present
    pub fn tf(&self, doc_id: DocId) -> Option<u32> {
        self.entries
            .binary_search_by_key(&doc_id, |e| e.doc_id)
            .ok()
            .map(|i| self.entries[i].tf)
    }
}

// ============================================================================
// InvertedIndex
// ============================================================================

/// Immutable inverted index over one document list
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    /// Term -> PostingList mapping
    postings: FxHashMap<String, PostingList>,

    /// Term -> document frequency
    doc_freqs: FxHashMap<String, usize>,

    /// DocId -> term frequency map
    doc_terms: Vec<FxHashMap<String, u32>>,

    /// DocId -> length in tokens
    doc_lengths: Vec<u32>,

    /// Sum of all document lengths (for average calculation)
    total_doc_len: u64,
}

impl InvertedIndex {
    /// Build the index from documents whose ids are their positions.
    ///
    /// Documents are tokenized from `searchable_text`. Posting lists come out
    /// in ascending DocId order because documents are visited in id order.
    pub fn build(documents: &[Document]) -> Self {
        let mut index = InvertedIndex::default();

        for (position, doc) in documents.iter().enumerate() {
            debug_assert_eq!(doc.id.index(), position, "DocId must equal position");

            let tokens = tokenize(&doc.searchable_text);
            let doc_len = tokens.len() as u32;

            let mut tf_map: FxHashMap<String, u32> = FxHashMap::default();
            for token in tokens {
                *tf_map.entry(token).or_insert(0) += 1;
            }

            for (term, tf) in &tf_map {
                index
                    .postings
                    .entry(term.clone())
                    .or_default()
                    .entries
                    .push(PostingEntry { doc_id: doc.id, tf: *tf });
                *index.doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }

            index.doc_terms.push(tf_map);
            index.doc_lengths.push(doc_len);
            index.total_doc_len += doc_len as u64;
        }

        index
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Get total number of indexed documents
    pub fn total_docs(&self) -> usize {
        self.doc_lengths.len()
    }

    /// Get document frequency for a term
    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    /// Get average document length (0.0 for an empty index)
    pub fn avg_doc_len(&self) -> f32 {
        let total = self.total_docs();
        if total == 0 {
            return 0.0;
        }
        self.total_doc_len as f32 / total as f32
    }

    /// Compute IDF for a term
    ///
    /// IDF(t) = ln((N - df + 0.5) / (df + 0.5))
    ///
    /// Negative for terms in more than half the corpus; scorers decide how to
    /// floor it.
    pub fn compute_idf(&self, term: &str) -> f32 {
        let n = self.total_docs() as f32;
        let df = self.doc_freq(term) as f32;
        ((n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Length of a document in tokens
    pub fn doc_len(&self, doc_id: DocId) -> Option<u32> {
        self.doc_lengths.get(doc_id.index()).copied()
    }

    /// Term frequency map of a document
    pub fn term_freqs(&self, doc_id: DocId) -> Option<&FxHashMap<String, u32>> {
        self.doc_terms.get(doc_id.index())
    }

    // ========================================================================
    // Query
    // ========================================================================

    /// Lookup documents containing a term
    pub fn lookup(&self, term: &str) -> Option<&PostingList> {
        self.postings.get(term)
    }

    /// Number of distinct terms
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }
}
