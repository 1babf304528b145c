//! Corpus entries and indexed documents
//!
//! `RawEntry` is what the corpus source hands us. `Document` is what the
//! indexer produces from it: immutable, identified by a dense `DocId` that is
//! only meaningful inside the snapshot that assigned it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// RawEntry
// ============================================================================

/// Which parser adapter handles an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Free-form knowledge or product text block, one document per entry
    #[default]
    Text,
    /// Catalog record whose `Variant:` lines expand into one document each
    Catalog,
}

/// A raw title/body text block from the corpus source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    /// Parser selection
    #[serde(default)]
    pub kind: EntryKind,
    /// Full text; the first non-empty line is the title
    pub body: String,
}

impl RawEntry {
    /// Create a free-text entry
    pub fn text(body: impl Into<String>) -> Self {
        RawEntry {
            kind: EntryKind::Text,
            body: body.into(),
        }
    }

    /// Create a catalog entry
    pub fn catalog(body: impl Into<String>) -> Self {
        RawEntry {
            kind: EntryKind::Catalog,
            body: body.into(),
        }
    }
}

// ============================================================================
// DocId
// ============================================================================

/// Dense document identifier, assigned in stable input order per snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl DocId {
    /// Position of the document in its snapshot's document list
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc-{}", self.0)
    }
}

// ============================================================================
// Structured fields
// ============================================================================

/// Price in whole cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price {
    cents: u64,
}

impl Price {
    /// Create a price from cents
    pub fn from_cents(cents: u64) -> Self {
        Price { cents }
    }

    /// Create a price from whole dollars
    pub fn from_dollars(dollars: u64) -> Self {
        Price {
            cents: dollars * 100,
        }
    }

    /// Value in cents
    pub fn cents(&self) -> u64 {
        self.cents
    }
}

impl fmt::Display for Price {
    /// `$899` for whole amounts, `$899.50` otherwise
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = self.cents / 100;
        let rest = self.cents % 100;
        if rest == 0 {
            write!(f, "${}", dollars)
        } else {
            write!(f, "${}.{:02}", dollars, rest)
        }
    }
}

/// Stock status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Availability {
    /// Ready to ship
    InStock,
    /// Not currently purchasable
    OutOfStock,
    /// Orderable, ships later
    Backorder,
    /// No stock information in the source text
    #[default]
    Unknown,
}

impl Availability {
    /// Human-readable label used by the formatter
    pub fn label(&self) -> &'static str {
        match self {
            Availability::InStock => "In stock",
            Availability::OutOfStock => "Out of stock",
            Availability::Backorder => "Backorder",
            Availability::Unknown => "Unknown",
        }
    }
}

/// Coarse product category derived from title keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    /// Complete stills and distillation units
    Distiller,
    /// Boilers and kettles
    Boiler,
    /// Electric heating elements
    HeatingElement,
    /// Temperature and power controllers
    Controller,
    /// Replacement parts and fittings
    Part,
    /// Bundles and kits
    Kit,
    /// Accessories and supplies
    Accessory,
    /// Anything that matched no rule
    #[default]
    General,
}

impl Category {
    /// Rule order for title classification; the first category whose
    /// keywords appear in the title wins.
    pub const RULE_ORDER: [Category; 7] = [
        Category::HeatingElement,
        Category::Controller,
        Category::Boiler,
        Category::Kit,
        Category::Part,
        Category::Accessory,
        Category::Distiller,
    ];

    /// Lowercase keywords that signal this category in a title or a query
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Distiller => &["distiller", "still", "alembic", "reflux", "gallon"],
            Category::Boiler => &["boiler", "kettle", "keg"],
            Category::HeatingElement => &["heating element", "element", "heater"],
            Category::Controller => &["controller", "pid", "regulator"],
            Category::Part => &["gasket", "valve", "clamp", "fitting", "column", "thumper", "lid"],
            Category::Kit => &["kit", "bundle", "package"],
            Category::Accessory => &[
                "hydrometer",
                "thermometer",
                "hose",
                "filter",
                "yeast",
                "book",
            ],
            Category::General => &[],
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Distiller => "Distiller",
            Category::Boiler => "Boiler",
            Category::HeatingElement => "Heating element",
            Category::Controller => "Controller",
            Category::Part => "Part",
            Category::Kit => "Kit",
            Category::Accessory => "Accessory",
            Category::General => "General",
        }
    }
}

/// Binary feature flag detected from keyword presence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    /// Shipping terms (free or included shipping)
    FreeShipping,
    /// 110/120 volt operation
    Volt110,
    /// 220/240 volt operation
    Volt220,
    /// Warranty or guarantee terms
    Warranty,
    /// Copper construction
    Copper,
    /// Ships with a controller
    Controller,
}

impl Feature {
    /// Every feature, in display order
    pub const ALL: [Feature; 6] = [
        Feature::Volt220,
        Feature::Volt110,
        Feature::Copper,
        Feature::Controller,
        Feature::Warranty,
        Feature::FreeShipping,
    ];

    /// Lowercase keywords that signal the feature in document text
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Feature::FreeShipping => &["free shipping", "ships free", "shipping included"],
            Feature::Volt110 => &["110v", "120v", "110 volt", "120 volt"],
            Feature::Volt220 => &["220v", "240v", "220 volt", "240 volt"],
            Feature::Warranty => &["warranty", "guarantee"],
            Feature::Copper => &["copper"],
            Feature::Controller => &["controller", "pid"],
        }
    }

    /// Lowercase keywords that signal interest in the feature in a query
    pub fn query_keywords(&self) -> &'static [&'static str] {
        match self {
            Feature::FreeShipping => &["shipping", "ship", "delivery"],
            Feature::Volt110 => &["110v", "120v", "110 volt", "120 volt"],
            Feature::Volt220 => &["220v", "240v", "220 volt", "240 volt"],
            Feature::Warranty => &["warranty", "guarantee"],
            Feature::Copper => &["copper"],
            Feature::Controller => &["controller", "pid"],
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Feature::FreeShipping => "Free shipping",
            Feature::Volt110 => "110V electric",
            Feature::Volt220 => "220V electric",
            Feature::Warranty => "Warranty",
            Feature::Copper => "Copper",
            Feature::Controller => "Controller included",
        }
    }
}

/// Fields extracted from the raw text at index time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StructuredFields {
    /// First price found in the trailing metadata window
    pub price: Option<Price>,
    /// Capacity normalized to US gallons
    pub capacity_gallons: Option<f32>,
    /// Detected feature flags
    pub features: BTreeSet<Feature>,
    /// Coarse category
    pub category: Category,
    /// Stock status
    pub availability: Availability,
}

// ============================================================================
// Document
// ============================================================================

/// Normalized, immutable document record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier within the owning snapshot
    pub id: DocId,
    /// First non-empty heading line
    pub title: String,
    /// Bounded description assembled from non-metadata lines
    pub raw_text: String,
    /// Structured fields
    pub fields: StructuredFields,
    /// Lowercase concatenation used for tokenization
    pub searchable_text: String,
    /// Static popularity/quality prior
    pub base_relevance: f32,
}

impl Document {
    /// Whether the document carries a known price
    pub fn has_price(&self) -> bool {
        self.fields.price.is_some()
    }
}
