//! Corpus entry parsers
//!
//! This module provides:
//! - EntryParser trait: the adapter boundary between source formats and the indexer
//! - TextEntryParser: one document per text block
//! - CatalogEntryParser: one document per purchasable variant
//! - Field extractors shared by both (price, capacity, features, category, stock)
//!
//! Parsers never fail. An entry that cannot become a document is reported as
//! `ParseOutcome::Skipped` and counted by the indexer.

use once_cell::sync::Lazy;
use regex::Regex;
use sift_core::tokenizer::{contains_phrase, normalize};
use sift_core::{Availability, Category, EntryKind, Feature, IndexConfig, Price, RawEntry};
use std::collections::BTreeSet;

static LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(url|link|tags|sku|handle|image|vendor|variant|price|collection|type|section)\s*:",
    )
    .expect("invalid label regex")
});

static PRICE_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^price\s*:").expect("invalid price label regex"));

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\$|\busd\s?)\s*(\d{1,3}(?:,\d{3})+|\d+)(?:\.(\d{1,2}))?")
        .expect("invalid price regex")
});

static CAPACITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*-?\s*(gallons?|gal|liters?|litres?|l)\b")
        .expect("invalid capacity regex")
});

static VARIANT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^variant\s*:\s*(.+)$").expect("invalid variant regex"));

static SECTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:type|section)\s*:\s*(blog|navigation|nav|menu|footer|header|sitemap|policy)\b",
    )
    .expect("invalid section regex")
});

/// Leading title words that mark site chrome rather than catalog content
const NON_PRODUCT_TITLES: &[&str] = &[
    "blog",
    "navigation",
    "menu",
    "footer",
    "header",
    "sitemap",
    "breadcrumb",
];

const LITERS_PER_GALLON: f32 = 3.785_41;

// ============================================================================
// Parse results
// ============================================================================

/// A document as produced by a parser, before an id is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    /// Cleaned heading
    pub title: String,
    /// Bounded description
    pub description: String,
    /// First price found
    pub price: Option<Price>,
    /// Capacity in gallons
    pub capacity_gallons: Option<f32>,
    /// Feature flags
    pub features: BTreeSet<Feature>,
    /// Category from title rules
    pub category: Category,
    /// Stock status
    pub availability: Availability,
}

/// Why an entry produced no document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No non-empty heading line
    EmptyTitle,
    /// Blog, navigation, or other site chrome
    NonProduct,
}

/// Outcome of parsing one raw entry
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// One or more documents
    Documents(Vec<ParsedDocument>),
    /// Entry intentionally ignored
    Skipped(SkipReason),
}

// ============================================================================
// EntryParser trait
// ============================================================================

/// Adapter from a source-specific entry format to parsed documents
///
/// # Thread Safety
///
/// Parsers must be Send + Sync; the built-in ones are stateless.
pub trait EntryParser: Send + Sync {
    /// Parse one entry
    fn parse(&self, entry: &RawEntry, cfg: &IndexConfig) -> ParseOutcome;

    /// Name for debugging and logging
    fn name(&self) -> &str;
}

/// Built-in parser for an entry kind
pub fn parser_for(kind: EntryKind) -> &'static dyn EntryParser {
    static TEXT: TextEntryParser = TextEntryParser;
    static CATALOG: CatalogEntryParser = CatalogEntryParser;
    match kind {
        EntryKind::Text => &TEXT,
        EntryKind::Catalog => &CATALOG,
    }
}

// ============================================================================
// TextEntryParser
// ============================================================================

/// One document per entry: title, description, and fields from the whole block
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEntryParser;

impl EntryParser for TextEntryParser {
    fn parse(&self, entry: &RawEntry, cfg: &IndexConfig) -> ParseOutcome {
        match EntryLines::split(&entry.body) {
            Ok(lines) => ParseOutcome::Documents(vec![lines.base_document(cfg)]),
            Err(reason) => ParseOutcome::Skipped(reason),
        }
    }

    fn name(&self) -> &str {
        "text"
    }
}

// ============================================================================
// CatalogEntryParser
// ============================================================================

/// Expands `Variant: <name> | <price> | <availability>` lines into one
/// document per variant. Records without variant lines parse like text.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogEntryParser;

impl EntryParser for CatalogEntryParser {
    fn parse(&self, entry: &RawEntry, cfg: &IndexConfig) -> ParseOutcome {
        let lines = match EntryLines::split(&entry.body) {
            Ok(lines) => lines,
            Err(reason) => return ParseOutcome::Skipped(reason),
        };

        let base = lines.base_document(cfg);
        let variants: Vec<&str> = lines
            .rest
            .iter()
            .filter_map(|line| VARIANT_RE.captures(line))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
            .filter(|spec| !spec.is_empty())
            .collect();

        if variants.is_empty() {
            return ParseOutcome::Documents(vec![base]);
        }

        let docs = variants
            .into_iter()
            .map(|spec| expand_variant(&base, spec))
            .collect();
        ParseOutcome::Documents(docs)
    }

    fn name(&self) -> &str {
        "catalog"
    }
}

fn expand_variant(base: &ParsedDocument, spec: &str) -> ParsedDocument {
    let mut parts = spec.split('|').map(str::trim);
    let name = parts.next().unwrap_or_default();
    let mut price = None;
    let mut availability = Availability::Unknown;
    for part in parts {
        if price.is_none() {
            price = extract_price(part);
        }
        if availability == Availability::Unknown {
            availability = detect_availability(&normalize(part));
        }
    }

    let title = if name.is_empty() {
        base.title.clone()
    } else {
        format!("{} - {}", base.title, name)
    };
    let normalized_title = normalize(&title);

    let mut features = base.features.clone();
    features.extend(detect_features(&normalize(name)));

    ParsedDocument {
        capacity_gallons: extract_capacity(name).or(base.capacity_gallons),
        price: price.or(base.price),
        availability: if availability == Availability::Unknown {
            base.availability
        } else {
            availability
        },
        category: classify(&normalized_title),
        features,
        description: base.description.clone(),
        title,
    }
}

// ============================================================================
// Shared line handling
// ============================================================================

struct EntryLines<'a> {
    title: String,
    rest: Vec<&'a str>,
}

impl<'a> EntryLines<'a> {
    fn split(body: &'a str) -> Result<Self, SkipReason> {
        let mut lines = body.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines
            .next()
            .map(clean_heading)
            .filter(|t| !t.is_empty())
            .ok_or(SkipReason::EmptyTitle)?;
        let rest: Vec<&str> = lines.collect();

        if is_non_product(&title, &rest) {
            return Err(SkipReason::NonProduct);
        }
        Ok(EntryLines { title, rest })
    }

    fn base_document(&self, cfg: &IndexConfig) -> ParsedDocument {
        let description = build_description(&self.rest, cfg.description_cap);
        let normalized_title = normalize(&self.title);
        let normalized_all = normalize(&format!("{} {}", self.title, self.rest.join(" ")));

        ParsedDocument {
            price: find_price(&self.rest, cfg.metadata_window),
            capacity_gallons: extract_capacity(&self.title)
                .or_else(|| self.rest.iter().find_map(|l| extract_capacity(l))),
            features: detect_features(&normalized_all),
            category: classify(&normalized_title),
            availability: detect_availability(&normalized_all),
            title: self.title.clone(),
            description,
        }
    }
}

fn clean_heading(line: &str) -> String {
    line.trim_matches(|c: char| matches!(c, '#' | '*' | '=') || c.is_whitespace())
        .to_string()
}

fn is_non_product(title: &str, rest: &[&str]) -> bool {
    let normalized = normalize(title);
    let first_word = normalized.split(' ').next().unwrap_or_default();
    if NON_PRODUCT_TITLES.contains(&first_word) || normalized.ends_with(" policy") {
        return true;
    }
    rest.iter().any(|line| SECTION_RE.is_match(line))
}

/// Whether a line is pure metadata (`URL:`, `Tags:`, ...)
pub fn is_metadata_line(line: &str) -> bool {
    LABEL_RE.is_match(line.trim())
}

fn build_description(lines: &[&str], cap: usize) -> String {
    let mut out = String::new();
    for line in lines.iter().filter(|l| !is_metadata_line(l)) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(line);
        if out.chars().count() >= cap {
            break;
        }
    }
    truncate_chars(&out, cap)
}

/// Cut a string to at most `cap` characters on a char boundary
pub fn truncate_chars(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => text[..byte_idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

// ============================================================================
// Field extractors
// ============================================================================

/// Price from a `Price:` line anywhere, else the first match in the trailing window
fn find_price(lines: &[&str], window: usize) -> Option<Price> {
    if let Some(price) = lines
        .iter()
        .filter(|l| PRICE_LABEL_RE.is_match(l))
        .find_map(|l| extract_price(l))
    {
        return Some(price);
    }
    let start = lines.len().saturating_sub(window);
    lines[start..].iter().find_map(|l| extract_price(l))
}

/// First currency amount in `text`
pub fn extract_price(text: &str) -> Option<Price> {
    let caps = PRICE_RE.captures(text)?;
    let dollars: u64 = caps.get(1)?.as_str().replace(',', "").parse().ok()?;
    let cents: u64 = match caps.get(2) {
        Some(m) if m.as_str().len() == 1 => m.as_str().parse::<u64>().ok()? * 10,
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    Some(Price::from_cents(dollars * 100 + cents))
}

/// First `<number> <unit>` capacity in `text`, in gallons
pub fn extract_capacity(text: &str) -> Option<f32> {
    let caps = CAPACITY_RE.captures(text)?;
    let amount: f32 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str().to_lowercase();
    if unit.starts_with("gal") {
        Some(amount)
    } else {
        Some(amount / LITERS_PER_GALLON)
    }
}

/// Feature flags whose keywords occur in normalized text
pub fn detect_features(normalized: &str) -> BTreeSet<Feature> {
    Feature::ALL
        .into_iter()
        .filter(|f| f.keywords().iter().any(|kw| contains_phrase(normalized, kw)))
        .collect()
}

/// First category rule whose keywords occur in the normalized title
pub fn classify(normalized_title: &str) -> Category {
    Category::RULE_ORDER
        .into_iter()
        .find(|c| {
            c.keywords()
                .iter()
                .any(|kw| contains_phrase(normalized_title, kw))
        })
        .unwrap_or(Category::General)
}

/// Stock status from normalized text
pub fn detect_availability(normalized: &str) -> Availability {
    let any = |phrases: &[&str]| phrases.iter().any(|p| contains_phrase(normalized, p));
    if any(&["out of stock", "sold out", "unavailable"]) {
        Availability::OutOfStock
    } else if any(&["backorder", "back order", "preorder", "pre order"]) {
        Availability::Backorder
    } else if any(&["in stock", "available now", "ships today"]) {
        Availability::InStock
    } else {
        Availability::Unknown
    }
}
