//! Collaborator outages and deadlines

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use sift::{CacheOutcome, CacheTier, RetrieveOptions, Retriever};

use crate::common::*;

// ============================================================================
// Shared store
// ============================================================================

#[test]
fn test_shared_outage_degrades_to_memory() {
    let flaky = Arc::new(FlakyStore::default());
    flaky.set_down(true);
    let r = Retriever::builder().shared_store(flaky.clone()).build().unwrap();
    let corpus = r.rebuild_index(&shop());
    let opts = RetrieveOptions::default();

    let first = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    let second = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();

    assert!(!first.trace.degraded());
    assert_eq!(second.trace.cache, CacheOutcome::Hit(CacheTier::Memory));

    let plain = Retriever::new();
    let plain_corpus = plain.rebuild_index(&shop());
    assert_eq!(first.text, plain.retrieve("copper still", &plain_corpus, 3).unwrap());

    // failed get + failed set on the first call
    assert_eq!(r.cache_stats().shared_errors, 2);
    assert!(flaky.inner.is_empty());
}

#[test]
fn test_shared_store_used_again_after_recovery() {
    let flaky = Arc::new(FlakyStore::default());
    let r = Retriever::builder().shared_store(flaky.clone()).build().unwrap();
    let corpus = r.rebuild_index(&shop());

    flaky.set_down(true);
    r.retrieve("gasket", &corpus, 2).unwrap();
    flaky.set_down(false);
    r.retrieve("copper still", &corpus, 2).unwrap();

    assert_eq!(flaky.inner.len(), 1);
}

// ============================================================================
// Estimator
// ============================================================================

#[test]
fn test_estimator_outage_skips_gate() {
    let failing = Arc::new(FailingEstimator::default());
    let r = Retriever::builder().estimator(failing.clone()).build().unwrap();
    let corpus = r.rebuild_index(&shop());
    let opts = RetrieveOptions::default();

    let res = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    assert!(res.trace.gate_skipped);
    assert!(res.trace.degraded());
    assert_eq!(res.trace.gated, None);
    assert!(!res.selected.is_empty());
    assert!(res.text.contains("Copper Pot Still"));

    // Degraded output is never cached
    let again = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    assert_eq!(again.trace.cache, CacheOutcome::Miss);
    assert!(!again.trace.stage_cache_hit);
    assert_eq!(failing.calls.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Deadline
// ============================================================================

#[test]
fn test_spent_deadline_returns_fused_candidates() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&advanced_models());
    let query = "10 gallon advanced model price";

    let res = r
        .retrieve_with(query, &corpus, 1, &RetrieveOptions::with_deadline(Duration::ZERO))
        .unwrap();
    assert!(res.trace.deadline_exceeded);
    assert_eq!(res.trace.gated, None);
    assert_eq!(res.selected.len(), 1);
    assert!(res.selected.iter().all(|c| c.gate_score.is_none() && c.selected));
    assert!(res.text.starts_with("[1] 10 Gallon Advanced Model"));

    // Nothing from the rushed call was cached
    let full = r
        .retrieve_with(query, &corpus, 1, &RetrieveOptions::default())
        .unwrap();
    assert_eq!(full.trace.cache, CacheOutcome::Miss);
    assert!(!full.trace.stage_cache_hit);
    assert!(!full.trace.deadline_exceeded);
    assert!(full.trace.gated.is_some());
}

#[test]
fn test_deadline_during_gating_returns_ungated_candidates() {
    let slow = Arc::new(SlowEstimator(Duration::from_millis(300)));
    let r = Retriever::builder().estimator(slow).build().unwrap();
    let corpus = r.rebuild_index(&advanced_models());

    let res = r
        .retrieve_with(
            "10 gallon advanced model price",
            &corpus,
            1,
            &RetrieveOptions::with_deadline(Duration::from_millis(150)),
        )
        .unwrap();

    // The estimator rejects everything, yet the answer comes from fused order
    assert!(res.trace.deadline_exceeded);
    assert_eq!(res.trace.gated, Some(0));
    assert_eq!(res.selected.len(), 1);
    assert!(res.selected.iter().all(|c| c.gate_score.is_none()));
    assert!(res.text.starts_with("[1] 10 Gallon Advanced Model"));
}

#[test]
fn test_generous_deadline_not_degraded() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    let res = r
        .retrieve_with(
            "copper still",
            &corpus,
            3,
            &RetrieveOptions::with_deadline(Duration::from_secs(60)),
        )
        .unwrap();
    assert!(!res.trace.degraded());
    assert!(res.trace.elapsed < Duration::from_secs(60));
}
