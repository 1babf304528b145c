//! Per-call options and diagnostics

use sift_cache::CacheTier;
use sift_core::Candidate;
use std::time::Duration;

/// Per-call knobs for [`Retriever::retrieve_with`](super::Retriever::retrieve_with)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrieveOptions {
    /// Time budget for the call. Checked before reranking and before
    /// diversity selection; once spent, the best fused candidates are
    /// rendered without gating and the result is not cached.
    pub deadline: Option<Duration>,
    /// Skip the result cache for lookup and store
    pub bypass_cache: bool,
}

impl RetrieveOptions {
    /// Options with a time budget
    pub fn with_deadline(deadline: Duration) -> Self {
        RetrieveOptions {
            deadline: Some(deadline),
            ..Self::default()
        }
    }

    /// Options that neither read nor write the result cache
    pub fn uncached() -> Self {
        RetrieveOptions {
            bypass_cache: true,
            ..Self::default()
        }
    }
}

/// How the result cache took part in a call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Looked up and not found (or not cacheable)
    #[default]
    Miss,
    /// Served from a cache tier
    Hit(CacheTier),
    /// Cache skipped on request
    Bypassed,
}

/// What happened during one call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalTrace {
    /// Version of the snapshot the call ran against
    pub snapshot_version: u64,
    /// Result cache participation
    pub cache: CacheOutcome,
    /// Gated pool came from the stage cache
    pub stage_cache_hit: bool,
    /// Documents with a lexical score
    pub lexical_hits: usize,
    /// Documents with a semantic score
    pub semantic_hits: usize,
    /// Candidates after fusion
    pub fused: usize,
    /// Candidates that passed the gate, when gating ran
    pub gated: Option<usize>,
    /// Candidates rendered
    pub selected: usize,
    /// Estimator failed; gating skipped
    pub gate_skipped: bool,
    /// Time budget ran out
    pub deadline_exceeded: bool,
    /// Wall time of the call
    pub elapsed: Duration,
}

impl RetrievalTrace {
    /// Whether the call ran with reduced precision
    pub fn degraded(&self) -> bool {
        self.gate_skipped || self.deadline_exceeded
    }
}

/// Rendered text plus the candidates behind it
#[derive(Debug, Clone)]
pub struct Retrieval {
    /// Formatted block, trailer included
    pub text: String,
    /// Candidates rendered, in order. Empty on a result cache hit and for
    /// the fallback text.
    pub selected: Vec<Candidate>,
    /// Diagnostics
    pub trace: RetrievalTrace,
}
