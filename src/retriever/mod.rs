//! End-to-end retrieval pipeline
//!
//! ```text
//! query ─▶ result cache ─hit─▶ text
//!            │miss
//!            ▼
//!          stage cache ─hit─▶ gated pool ─┐
//!            │miss                        │
//!            ▼                            │
//!          BM25 + semantic ─▶ fusion      │
//!            ─▶ rerank/gate ─▶ gated pool ┤
//!                                         ▼
//!                        diversity selection ─▶ formatter ─▶ text
//! ```
//!
//! Every call runs against one immutable [`CorpusHandle`]; `rebuild_index`
//! publishes a new snapshot without disturbing calls already in flight.
//!
//! Cache keys carry the corpus fingerprint and a hash of the configuration,
//! so retrievers in different processes can share one store without serving
//! each other answers rendered from a different corpus.

mod builder;
mod trace;

pub use builder::RetrieverBuilder;
pub use trace::{CacheOutcome, Retrieval, RetrievalTrace, RetrieveOptions};

use std::sync::Arc;
use std::time::Instant;

use sift_cache::{cache_key_with_limit, CacheStats, MemoryTier, SharedStore, TieredCache};
use sift_core::{Candidate, Error, Query, RawEntry, Result, SiftConfig, MAX_RESULTS};
use sift_index::{CorpusHandle, SnapshotCell};
use sift_rank::{
    gate, sort_by_fused, Bm25Scorer, DiversitySelector, Fuser, RelevanceEstimator, Reranker,
    ResultFormatter, Scorer, SemanticScorer, WeightedFuser,
};
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

/// Scope of stage-cache keys; result keys use `n<max_results>`
const POOL_SCOPE: &str = "pool";

/// Hash of every setting that shapes rendered output, estimator included.
///
/// `Debug` covers each field, nested ones included. A change in its
/// rendering between builds only costs shared-tier misses.
fn config_namespace(config: &SiftConfig, estimator: Option<&str>) -> u64 {
    xxh3_64(format!("{:?}|{:?}", config, estimator).as_bytes())
}

/// Prompt-context retriever
///
/// # Thread Safety
///
/// `Retriever` is `Send + Sync`; share it behind an `Arc`. Retrieval calls
/// only read the snapshot they were handed, and the caches lock internally.
pub struct Retriever {
    config: SiftConfig,
    snapshots: SnapshotCell,
    bm25: Bm25Scorer,
    semantic: SemanticScorer,
    fuser: WeightedFuser,
    reranker: Option<Reranker>,
    selector: DiversitySelector,
    formatter: ResultFormatter,
    results: TieredCache,
    pools: MemoryTier<Arc<Vec<Candidate>>>,
    namespace: u64,
}

impl Retriever {
    /// Retriever with default configuration and an empty corpus
    pub fn new() -> Self {
        Self::assemble(
            SiftConfig::default(),
            Some(Arc::new(sift_rank::HeuristicEstimator::default())),
            None,
        )
    }

    /// Create a builder
    pub fn builder() -> RetrieverBuilder {
        RetrieverBuilder::new()
    }

    pub(crate) fn assemble(
        config: SiftConfig,
        estimator: Option<Arc<dyn RelevanceEstimator>>,
        shared: Option<Arc<dyn SharedStore>>,
    ) -> Self {
        let mut results = TieredCache::new(&config.cache);
        if let Some(store) = shared {
            results = results.with_shared(store);
        }
        let reranker = if config.gate.enabled {
            estimator.map(Reranker::new)
        } else {
            None
        };

        Retriever {
            bm25: Bm25Scorer::from_config(&config.bm25),
            semantic: SemanticScorer::new(config.semantic.clone()),
            fuser: WeightedFuser::from_config(&config.fusion),
            selector: DiversitySelector::from_config(&config.diversity),
            formatter: ResultFormatter::new(config.format.clone()),
            pools: MemoryTier::new(config.cache.stage_capacity, config.cache.eviction_fraction),
            snapshots: SnapshotCell::new(),
            namespace: config_namespace(&config, reranker.as_ref().map(Reranker::estimator_name)),
            reranker,
            results,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &SiftConfig {
        &self.config
    }

    /// Whether candidates are gated by an estimator
    pub fn gating_enabled(&self) -> bool {
        self.reranker.is_some()
    }

    // ========================================================================
    // Corpus
    // ========================================================================

    /// Latest published snapshot
    pub fn current(&self) -> CorpusHandle {
        self.snapshots.current()
    }

    /// Build and publish a snapshot of `corpus`.
    ///
    /// Calls holding an older handle finish against it. Cached results are
    /// invalidated; keys also carry the corpus fingerprint, so nothing
    /// rendered from different content is served for the new corpus.
    pub fn rebuild_index(&self, corpus: &[RawEntry]) -> CorpusHandle {
        let snapshot = self.snapshots.publish(corpus, &self.config.index);
        self.results.invalidate_all();
        self.pools.clear();
        info!(
            version = snapshot.version(),
            docs = snapshot.len(),
            "Retriever corpus rebuilt"
        );
        snapshot
    }

    // ========================================================================
    // Retrieval
    // ========================================================================

    /// Render the best `max_results` documents for `query`.
    ///
    /// # Errors
    ///
    /// `Error::InvalidArgument` when `max_results` is 0 or above
    /// [`MAX_RESULTS`]. An empty query or corpus is not an error; it yields
    /// the fallback text.
    pub fn retrieve(
        &self,
        query: &str,
        corpus: &CorpusHandle,
        max_results: usize,
    ) -> Result<String> {
        self.retrieve_with(query, corpus, max_results, &RetrieveOptions::default())
            .map(|r| r.text)
    }

    /// [`retrieve`](Self::retrieve) against the latest snapshot
    pub fn retrieve_current(&self, query: &str, max_results: usize) -> Result<String> {
        self.retrieve(query, &self.current(), max_results)
    }

    /// Full pipeline with options and diagnostics
    pub fn retrieve_with(
        &self,
        query: &str,
        corpus: &CorpusHandle,
        max_results: usize,
        options: &RetrieveOptions,
    ) -> Result<Retrieval> {
        if max_results == 0 || max_results > MAX_RESULTS {
            return Err(Error::invalid_argument(format!(
                "max_results must be within 1..={}, got {}",
                MAX_RESULTS, max_results
            )));
        }

        let started = Instant::now();
        let deadline = options.deadline.map(|d| started + d);
        let expired = || deadline.is_some_and(|d| Instant::now() >= d);

        let query = Query::new(query);
        let mut trace = RetrievalTrace {
            snapshot_version: corpus.version(),
            ..RetrievalTrace::default()
        };

        if query.is_empty() || corpus.is_empty() {
            debug!(
                empty_query = query.is_empty(),
                empty_corpus = corpus.is_empty(),
                "Nothing to retrieve"
            );
            return Ok(self.finish(self.formatter.fallback(), Vec::new(), trace, started));
        }

        let result_key = self.key(&query, corpus, &format!("n{}", max_results));

        if options.bypass_cache {
            trace.cache = CacheOutcome::Bypassed;
        } else if let Some((text, tier)) = self.results.lookup(&result_key) {
            trace.cache = CacheOutcome::Hit(tier);
            return Ok(self.finish(text, Vec::new(), trace, started));
        }

        // Fused order, kept for a deadline that expires during gating
        let mut ungated: Option<Vec<Candidate>> = None;
        let pool_key = self.key(&query, corpus, POOL_SCOPE);
        let pool: Vec<Candidate> = match self.pools.get(&pool_key) {
            Some(pool) => {
                trace.stage_cache_hit = true;
                pool.as_ref().clone()
            }
            None => {
                let lexical = self.bm25.score(&query, corpus);
                let semantic = self.semantic.score(&query, corpus);
                let fused = self.fuser.fuse(&lexical, &semantic, corpus);
                trace.lexical_hits = lexical.len();
                trace.semantic_hits = semantic.len();
                trace.fused = fused.len();
                debug!(
                    lexical = lexical.len(),
                    semantic = semantic.len(),
                    fused = fused.len(),
                    "Scored candidates"
                );

                if expired() {
                    return Ok(self.deadline_fallback(fused, corpus, max_results, trace, started));
                }
                if deadline.is_some() {
                    ungated = Some(fused.clone());
                }

                let pool = self.gate_pool(&query, fused, corpus, &mut trace);
                if !trace.gate_skipped {
                    self.pools
                        .insert(pool_key, Arc::new(pool.clone()), self.results.default_ttl());
                }
                pool
            }
        };

        if expired() {
            // A cached pool has no fused list behind it; it was gated earlier
            let candidates = ungated.unwrap_or(pool);
            return Ok(self.deadline_fallback(candidates, corpus, max_results, trace, started));
        }

        let selected = self.selector.select(pool, corpus, max_results);
        let text = self.formatter.format(&selected, corpus);

        if !options.bypass_cache && !trace.degraded() {
            self.results.insert(&result_key, text.clone());
        }
        Ok(self.finish(text, selected, trace, started))
    }

    /// Cache counters for formatted results
    pub fn cache_stats(&self) -> CacheStats {
        self.results.stats()
    }

    /// Drop every cached result and candidate pool
    pub fn clear_cache(&self) {
        self.results.invalidate_all();
        self.pools.clear();
    }

    // ========================================================================
    // Stages
    // ========================================================================

    fn key(&self, query: &Query, corpus: &CorpusHandle, scope: &str) -> String {
        cache_key_with_limit(
            &query.raw,
            corpus.fingerprint(),
            &format!("{:016x}|{}", self.namespace, scope),
            self.config.cache.max_key_chars,
        )
    }

    /// Candidates handed to diversity selection: gated when an estimator is
    /// configured and healthy, otherwise the top fused candidates.
    fn gate_pool(
        &self,
        query: &Query,
        fused: Vec<Candidate>,
        corpus: &CorpusHandle,
        trace: &mut RetrievalTrace,
    ) -> Vec<Candidate> {
        let top_k = self.config.gate.top_k;
        let Some(reranker) = &self.reranker else {
            let mut pool = fused;
            pool.truncate(top_k);
            return pool;
        };

        match reranker.rerank(query, fused.clone(), top_k, corpus) {
            Ok(scored) => {
                let kept = gate(scored, self.config.gate.threshold, corpus);
                trace.gated = Some(kept.len());
                debug!(
                    gated = kept.len(),
                    threshold = self.config.gate.threshold,
                    "Gated candidates"
                );
                kept
            }
            Err(e) => {
                warn!(
                    estimator = reranker.estimator_name(),
                    error = %e,
                    "Relevance estimator failed, skipping gate"
                );
                trace.gate_skipped = true;
                let mut pool = fused;
                pool.truncate(top_k);
                pool
            }
        }
    }

    fn deadline_fallback(
        &self,
        mut candidates: Vec<Candidate>,
        corpus: &CorpusHandle,
        max_results: usize,
        mut trace: RetrievalTrace,
        started: Instant,
    ) -> Retrieval {
        warn!(
            elapsed_us = started.elapsed().as_micros() as u64,
            "Retrieval deadline exceeded, returning fused candidates"
        );
        trace.deadline_exceeded = true;
        sort_by_fused(&mut candidates, corpus);
        candidates.truncate(max_results);
        for c in &mut candidates {
            c.gate_score = None;
            c.selected = true;
        }
        let text = self.formatter.format(&candidates, corpus);
        self.finish(text, candidates, trace, started)
    }

    fn finish(
        &self,
        text: String,
        selected: Vec<Candidate>,
        mut trace: RetrievalTrace,
        started: Instant,
    ) -> Retrieval {
        trace.selected = selected.len();
        trace.elapsed = started.elapsed();
        Retrieval {
            text,
            selected,
            trace,
        }
    }
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new()
    }
}
