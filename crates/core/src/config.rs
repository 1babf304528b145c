//! Retrieval configuration via `sift.toml`
//!
//! Every tunable constant of the pipeline lives here: BM25 parameters,
//! heuristic weights, fusion weights, the gate threshold, the MMR lambda,
//! formatter budgets, and cache sizing. All fields have defaults, so an empty
//! file (or no file) yields the stock configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name conventionally used by embedding services
pub const CONFIG_FILE_NAME: &str = "sift.toml";

// ============================================================================
// Sections
// ============================================================================

/// Corpus parsing limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Maximum description length in characters
    pub description_cap: usize,
    /// Number of trailing lines searched for a price
    pub metadata_window: usize,
    /// Capacity (gallons) that receives the largest popularity prior
    pub capacity_sweet_spot_gallons: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            description_cap: 600,
            metadata_window: 8,
            capacity_sweet_spot_gallons: 10.0,
        }
    }
}

/// BM25 constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    /// Term frequency saturation
    pub k1: f32,
    /// Length normalization
    pub b: f32,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Bm25Config { k1: 1.4, b: 0.6 }
    }
}

/// Additive weights for the heuristic scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticConfig {
    /// Title contained in the query (or query a prefix of the title)
    pub title_match: f32,
    /// Price intent in the query and the document has a price
    pub price_intent: f32,
    /// Query capacity equals document capacity
    pub capacity_exact: f32,
    /// Query capacity within tolerance of document capacity
    pub capacity_near: f32,
    /// Tolerance for a near capacity match, in gallons
    pub capacity_tolerance_gallons: f32,
    /// Per feature mentioned by the query and present on the document
    pub feature_match: f32,
    /// Query mentions the document's category
    pub category_match: f32,
    /// Stock intent in the query and the document is in stock
    pub stock_intent: f32,
}

impl Default for SemanticConfig {
    fn default() -> Self {
        SemanticConfig {
            title_match: 5.0,
            price_intent: 2.0,
            capacity_exact: 3.0,
            capacity_near: 1.0,
            capacity_tolerance_gallons: 2.0,
            feature_match: 2.0,
            category_match: 1.0,
            stock_intent: 1.0,
        }
    }
}

/// Candidate fusion weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Weight of the BM25 score when both scores are present
    pub lexical_weight: f32,
    /// Weight of the heuristic score when both scores are present
    pub semantic_weight: f32,
}

impl Default for FusionConfig {
    fn default() -> Self {
        FusionConfig {
            lexical_weight: 0.6,
            semantic_weight: 0.4,
        }
    }
}

/// Relevance gate settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Run the reranker at all
    pub enabled: bool,
    /// Number of fused candidates handed to the reranker
    pub top_k: usize,
    /// Candidates estimated below this are dropped
    pub threshold: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            enabled: true,
            top_k: 12,
            threshold: 0.4,
        }
    }
}

/// Maximal marginal relevance settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiversityConfig {
    /// Relevance vs. redundancy trade-off (1.0 = relevance only)
    pub lambda: f32,
    /// Share of the gate score in a candidate's relevance
    pub gate_blend: f32,
}

impl Default for DiversityConfig {
    fn default() -> Self {
        DiversityConfig {
            lambda: 0.7,
            gate_blend: 0.5,
        }
    }
}

/// Result formatter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatConfig {
    /// Static block appended to every rendering
    pub trailer: String,
    /// Sentence rendered when nothing was selected
    pub fallback: String,
    /// Upper bound on the rendered block, trailer included
    pub max_block_chars: usize,
    /// Per-item description cap
    pub description_chars: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            trailer: "For orders or questions, contact our support team by phone or email."
                .to_string(),
            fallback: "No matching product or knowledge entry was found for this question."
                .to_string(),
            max_block_chars: 2400,
            description_chars: 320,
        }
    }
}

/// Cache sizing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time to live for formatted results, in seconds
    pub ttl_secs: u64,
    /// In-process capacity for formatted results
    pub memory_capacity: usize,
    /// In-process capacity for intermediate candidate pools
    pub stage_capacity: usize,
    /// Share of a full tier evicted at once
    pub eviction_fraction: f32,
    /// Normalized query length cap inside cache keys
    pub max_key_chars: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: 300,
            memory_capacity: 512,
            stage_capacity: 256,
            eviction_fraction: 0.2,
            max_key_chars: 200,
        }
    }
}

// ============================================================================
// SiftConfig
// ============================================================================

/// Full retrieval configuration loaded from `sift.toml`.
///
/// # Example
///
/// ```toml
/// [bm25]
/// k1 = 1.4
/// b = 0.6
///
/// [gate]
/// threshold = 0.4
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiftConfig {
    /// Corpus parsing
    #[serde(default)]
    pub index: IndexConfig,
    /// Lexical scorer
    #[serde(default)]
    pub bm25: Bm25Config,
    /// Heuristic scorer
    #[serde(default)]
    pub semantic: SemanticConfig,
    /// Candidate fusion
    #[serde(default)]
    pub fusion: FusionConfig,
    /// Relevance gate
    #[serde(default)]
    pub gate: GateConfig,
    /// Diversity selection
    #[serde(default)]
    pub diversity: DiversityConfig,
    /// Rendering
    #[serde(default)]
    pub format: FormatConfig,
    /// Caching
    #[serde(default)]
    pub cache: CacheConfig,
}

impl SiftConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        fn unit(name: &str, v: f32) -> Result<()> {
            if (0.0..=1.0).contains(&v) {
                Ok(())
            } else {
                Err(Error::config(format!("{} must be within [0, 1], got {}", name, v)))
            }
        }
        fn non_negative(name: &str, v: f32) -> Result<()> {
            if v.is_finite() && v >= 0.0 {
                Ok(())
            } else {
                Err(Error::config(format!("{} must be non-negative, got {}", name, v)))
            }
        }
        fn positive(name: &str, v: usize) -> Result<()> {
            if v > 0 {
                Ok(())
            } else {
                Err(Error::config(format!("{} must be greater than zero", name)))
            }
        }

        non_negative("bm25.k1", self.bm25.k1)?;
        unit("bm25.b", self.bm25.b)?;
        non_negative("fusion.lexical_weight", self.fusion.lexical_weight)?;
        non_negative("fusion.semantic_weight", self.fusion.semantic_weight)?;
        unit("gate.threshold", self.gate.threshold)?;
        positive("gate.top_k", self.gate.top_k)?;
        unit("diversity.lambda", self.diversity.lambda)?;
        unit("diversity.gate_blend", self.diversity.gate_blend)?;
        non_negative(
            "semantic.capacity_tolerance_gallons",
            self.semantic.capacity_tolerance_gallons,
        )?;
        positive("index.description_cap", self.index.description_cap)?;
        positive("format.max_block_chars", self.format.max_block_chars)?;
        positive("cache.memory_capacity", self.cache.memory_capacity)?;
        positive("cache.stage_capacity", self.cache.stage_capacity)?;
        positive("cache.max_key_chars", self.cache.max_key_chars)?;
        if !(self.cache.eviction_fraction > 0.0 && self.cache.eviction_fraction <= 1.0) {
            return Err(Error::config(format!(
                "cache.eviction_fraction must be within (0, 1], got {}",
                self.cache.eviction_fraction
            )));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# sift retrieval configuration
#
# All values are optional; missing keys fall back to these defaults.

[bm25]
k1 = 1.4   # term frequency saturation
b = 0.6    # length normalization

[fusion]
lexical_weight = 0.6
semantic_weight = 0.4

[gate]
enabled = true
top_k = 12        # fused candidates handed to the reranker
threshold = 0.4   # candidates estimated below this are dropped

[diversity]
lambda = 0.7      # 1.0 = relevance only, 0.0 = diversity only
gate_blend = 0.5

[cache]
ttl_secs = 300
memory_capacity = 512
stage_capacity = 256
eviction_fraction = 0.2
"#
    }

    /// Parse config from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SiftConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(msg) => Error::config(format!("{} ({})", msg, path.display())),
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml())?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
