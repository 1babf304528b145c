//! Heuristic semantic scoring from query intent and structured fields
//!
//! Adds fixed weights for evidence BM25 cannot see: the query naming the
//! document's title, asking about price or stock, or mentioning a capacity,
//! feature, or category the document carries.

use crate::scorer::{sort_scored, Scorer};
use sift_core::{
    contains_phrase, normalize, Availability, Category, DocId, Document, Feature, Query,
    SemanticConfig,
};
use sift_index::parser::extract_capacity;
use sift_index::CorpusSnapshot;

/// Query phrases that ask about price
pub const PRICE_INTENT: &[&str] = &[
    "price", "prices", "pricing", "cost", "costs", "how much", "cheap", "cheapest",
];

/// Query phrases that ask about availability
pub const STOCK_INTENT: &[&str] = &["stock", "in stock", "available", "availability"];

/// Minimum query length for title prefix matching
const TITLE_PREFIX_MIN_CHARS: usize = 3;

/// Capacity difference treated as an exact match, in gallons
const CAPACITY_EXACT_EPSILON: f32 = 0.05;

/// Whether the query asks about price
pub fn has_price_intent(query: &Query) -> bool {
    query.raw.contains('$')
        || PRICE_INTENT
            .iter()
            .any(|p| contains_phrase(query.normalized(), p))
}

/// Whether the query asks about stock status
pub fn has_stock_intent(query: &Query) -> bool {
    STOCK_INTENT.iter().any(|p| contains_phrase(query.normalized(), p))
}

/// Weighted-sum heuristic scorer
#[derive(Debug, Clone, Default)]
pub struct SemanticScorer {
    cfg: SemanticConfig,
}

impl SemanticScorer {
    /// Create with the given weights
    pub fn new(cfg: SemanticConfig) -> Self {
        SemanticScorer { cfg }
    }

    /// Active weights
    pub fn config(&self) -> &SemanticConfig {
        &self.cfg
    }

    /// Score a single document; 0.0 when nothing matched
    pub fn score_document(&self, query: &Query, doc: &Document) -> f32 {
        let q = query.normalized();
        if q.is_empty() {
            return 0.0;
        }
        let fields = &doc.fields;
        let mut score = 0.0;

        let title = normalize(&doc.title);
        if !title.is_empty()
            && (contains_phrase(q, &title)
                || (q.chars().count() >= TITLE_PREFIX_MIN_CHARS && title.starts_with(q)))
        {
            score += self.cfg.title_match;
        }

        if doc.has_price() && has_price_intent(query) {
            score += self.cfg.price_intent;
        }

        let capacity = (extract_capacity(&query.raw), fields.capacity_gallons);
        if let (Some(wanted), Some(have)) = capacity {
            let diff = (wanted - have).abs();
            if diff < CAPACITY_EXACT_EPSILON {
                score += self.cfg.capacity_exact;
            } else if diff <= self.cfg.capacity_tolerance_gallons {
                score += self.cfg.capacity_near;
            }
        }

        score += self.cfg.feature_match
            * fields
                .features
                .iter()
                .filter(|f| mentions_feature(q, **f))
                .count() as f32;

        if fields.category != Category::General
            && fields.category.keywords().iter().any(|kw| contains_phrase(q, kw))
        {
            score += self.cfg.category_match;
        }

        if fields.availability == Availability::InStock && has_stock_intent(query) {
            score += self.cfg.stock_intent;
        }

        score
    }
}

fn mentions_feature(normalized_query: &str, feature: Feature) -> bool {
    feature
        .query_keywords()
        .iter()
        .any(|kw| contains_phrase(normalized_query, kw))
}

impl Scorer for SemanticScorer {
    fn score(&self, query: &Query, snapshot: &CorpusSnapshot) -> Vec<(DocId, f32)> {
        if query.normalized().is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(DocId, f32)> = snapshot
            .documents()
            .iter()
            .map(|doc| (doc.id, self.score_document(query, doc)))
            .filter(|(_, s)| *s > 0.0)
            .collect();
        sort_scored(&mut scored);
        scored
    }

    fn name(&self) -> &str {
        "semantic"
    }
}
