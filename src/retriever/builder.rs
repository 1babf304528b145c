//! Retriever builder for fluent configuration

use std::path::PathBuf;
use std::sync::Arc;

use sift_cache::SharedStore;
use sift_core::{RawEntry, Result, SiftConfig};
use sift_rank::{HeuristicEstimator, RelevanceEstimator};

use super::Retriever;

// ============================================================================
// Retriever Builder Pattern
// ============================================================================

/// Builder for Retriever configuration
///
/// ```
/// use sift::{RawEntry, Retriever};
///
/// let retriever = Retriever::builder()
///     .corpus(vec![RawEntry::text("Copper Pot Still\nPrice: $499")])
///     .build()?;
/// let text = retriever.retrieve_current("copper still", 3)?;
/// assert!(text.contains("Copper Pot Still"));
/// # Ok::<(), sift::Error>(())
/// ```
pub struct RetrieverBuilder {
    config: SiftConfig,
    config_path: Option<PathBuf>,
    estimator: Option<Arc<dyn RelevanceEstimator>>,
    shared: Option<Arc<dyn SharedStore>>,
    corpus: Option<Vec<RawEntry>>,
}

impl RetrieverBuilder {
    /// Create new builder with defaults
    ///
    /// Defaults to the built-in heuristic estimator and a memory-only cache.
    pub fn new() -> Self {
        Self {
            config: SiftConfig::default(),
            config_path: None,
            estimator: Some(Arc::new(HeuristicEstimator::default())),
            shared: None,
            corpus: None,
        }
    }

    /// Use an explicit configuration
    pub fn config(mut self, config: SiftConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a `sift.toml` at `build()` time.
    ///
    /// A commented default file is written when the path does not exist yet.
    /// Takes precedence over [`config`](Self::config).
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Gate candidates with a custom estimator
    pub fn estimator(mut self, estimator: Arc<dyn RelevanceEstimator>) -> Self {
        self.estimator = Some(estimator);
        self
    }

    /// Skip relevance gating entirely
    pub fn without_estimator(mut self) -> Self {
        self.estimator = None;
        self
    }

    /// Add a shared cache tier
    pub fn shared_store(mut self, store: Arc<dyn SharedStore>) -> Self {
        self.shared = Some(store);
        self
    }

    /// Publish an initial corpus on build
    pub fn corpus(mut self, corpus: Vec<RawEntry>) -> Self {
        self.corpus = Some(corpus);
        self
    }

    /// Build the retriever
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The config file cannot be written, read, or parsed
    /// - Any config value is out of range (`Error::Config`)
    pub fn build(self) -> Result<Retriever> {
        let config = match &self.config_path {
            Some(path) => {
                SiftConfig::write_default_if_missing(path)?;
                SiftConfig::from_file(path)?
            }
            None => self.config,
        };
        config.validate()?;

        let retriever = Retriever::assemble(config, self.estimator, self.shared);
        if let Some(corpus) = self.corpus {
            retriever.rebuild_index(&corpus);
        }
        Ok(retriever)
    }
}

impl Default for RetrieverBuilder {
    fn default() -> Self {
        Self::new()
    }
}
