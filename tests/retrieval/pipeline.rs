//! Ranking scenarios, output shape, and contract checks

use std::collections::HashSet;
use std::sync::Arc;

use sift::{CorpusHandle, Error, Retrieval, RetrieveOptions, Retriever, SiftConfig, MAX_RESULTS};

use crate::common::*;

fn titles(corpus: &CorpusHandle, retrieval: &Retrieval) -> Vec<String> {
    retrieval
        .selected
        .iter()
        .map(|c| corpus.document(c.doc_id).unwrap().title.clone())
        .collect()
}

fn fallback(r: &Retriever) -> String {
    let f = &r.config().format;
    format!("{}\n\n{}", f.fallback, f.trailer)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_ten_gallon_price_query_ranks_899_model_first() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&advanced_models());

    let res = r
        .retrieve_with("10 gallon advanced model price", &corpus, 3, &RetrieveOptions::default())
        .unwrap();

    assert_eq!(titles(&corpus, &res)[0], "10 Gallon Advanced Model");
    assert!(res.text.starts_with("[1] 10 Gallon Advanced Model"));
    assert!(res.text.contains("899"));
}

#[test]
fn test_ten_gallon_price_query_in_mixed_shop() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    let res = r
        .retrieve_with("10 gallon advanced model price", &corpus, 3, &RetrieveOptions::default())
        .unwrap();

    assert_eq!(titles(&corpus, &res)[0], "10 Gallon Advanced Model");
    assert!(res.text.contains("$899"));
}

#[test]
fn test_220v_element_stock_query_finds_heating_element() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    let res = r
        .retrieve_with("220v element stock", &corpus, 3, &RetrieveOptions::default())
        .unwrap();

    assert!(titles(&corpus, &res)
        .iter()
        .any(|t| t == "220v Electric Heating Element with Controller"));
    assert!(res.text.contains("$299"));
}

#[test]
fn test_catalog_variants_are_individually_retrievable() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    let text = r.retrieve("thumper keg 3 gallon", &corpus, 3).unwrap();
    assert!(text.contains("Thumper Keg - 3 Gallon"));
    assert!(text.contains("Out of stock"));
}

#[test]
fn test_policy_pages_never_rendered() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    let text = r.retrieve("shipping policy orders", &corpus, 5).unwrap();
    assert!(!text.contains("Shipping Policy"));
}

// ============================================================================
// Determinism and shape
// ============================================================================

#[test]
fn test_same_query_same_output() {
    let queries = ["copper still", "10 gallon advanced model price", "220v element stock"];
    let a = Retriever::new();
    let b = Retriever::new();
    let ca = a.rebuild_index(&shop());
    let cb = b.rebuild_index(&shop());

    for q in queries {
        let first = a.retrieve_with(q, &ca, 4, &RetrieveOptions::uncached()).unwrap();
        for _ in 0..5 {
            let again = a.retrieve_with(q, &ca, 4, &RetrieveOptions::uncached()).unwrap();
            assert_eq!(first.text, again.text, "query {q:?} changed between calls");
        }
        assert_eq!(first.text, b.retrieve(q, &cb, 4).unwrap());
    }
}

#[test]
fn test_selection_bounded_and_unique() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    for n in 1..=5 {
        let res = r
            .retrieve_with("copper still gallon", &corpus, n, &RetrieveOptions::uncached())
            .unwrap();
        assert!(res.selected.len() <= n);
        let ids: HashSet<_> = res.selected.iter().map(|c| c.doc_id).collect();
        assert_eq!(ids.len(), res.selected.len());
        assert!(res.selected.iter().all(|c| c.selected));
        assert_eq!(res.trace.selected, res.selected.len());
    }
}

#[test]
fn test_output_respects_block_limit() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&long_corpus(30));
    let limit = r.config().format.max_block_chars;

    let text = r.retrieve("reflux column copper packing", &corpus, MAX_RESULTS).unwrap();
    assert!(text.chars().count() <= limit);
    assert!(text.starts_with("[1] Reflux Column Model"));
    assert!(text.ends_with(&r.config().format.trailer));
}

#[test]
fn test_first_item_survives_tiny_budget() {
    let mut config = SiftConfig::default();
    config.format.max_block_chars = 200;
    let r = Retriever::builder().config(config).build().unwrap();
    let corpus = r.rebuild_index(&long_corpus(3));

    let text = r.retrieve("reflux column", &corpus, 3).unwrap();
    assert!(text.starts_with("[1] Reflux Column Model"));
    assert!(!text.contains("[2]"));
    assert!(text.ends_with(&r.config().format.trailer));
}

#[test]
fn test_trailer_identical_across_queries() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    let trailer = r.config().format.trailer.clone();

    for q in ["copper", "gasket", "zzzz unknown", ""] {
        let text = r.retrieve(q, &corpus, 3).unwrap();
        assert!(text.ends_with(&format!("\n\n{}", trailer)), "query {q:?}");
    }
}

// ============================================================================
// Empty input and contract violations
// ============================================================================

#[test]
fn test_empty_corpus_returns_fallback() {
    let r = Retriever::new();
    assert_eq!(r.current().version(), 0);
    assert_eq!(r.retrieve_current("copper still", 3).unwrap(), fallback(&r));
}

#[test]
fn test_tokenless_query_returns_fallback() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    assert_eq!(r.retrieve("  ?? !! ", &corpus, 3).unwrap(), fallback(&r));
    assert_eq!(r.retrieve("a an", &corpus, 3).unwrap(), fallback(&r));
}

#[test]
fn test_unmatched_query_returns_fallback() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    assert_eq!(r.retrieve("zzzz qqqq", &corpus, 3).unwrap(), fallback(&r));
}

#[test]
fn test_max_results_out_of_range_rejected() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    for n in [0, MAX_RESULTS + 1, usize::MAX] {
        assert!(matches!(
            r.retrieve("copper", &corpus, n),
            Err(Error::InvalidArgument(_))
        ));
    }
    // Checked before the empty-input shortcut
    assert!(matches!(
        Retriever::new().retrieve_current("", 0),
        Err(Error::InvalidArgument(_))
    ));
}

// ============================================================================
// Gating
// ============================================================================

#[test]
fn test_gate_drops_candidates_below_threshold() {
    let r = Retriever::builder()
        .estimator(Arc::new(FixedEstimator(0.39)))
        .build()
        .unwrap();
    let corpus = r.rebuild_index(&shop());

    let res = r
        .retrieve_with("copper still", &corpus, 3, &RetrieveOptions::default())
        .unwrap();
    assert_eq!(res.trace.gated, Some(0));
    assert!(res.selected.is_empty());
    assert_eq!(res.text, fallback(&r));
}

#[test]
fn test_gate_keeps_candidates_at_threshold() {
    let r = Retriever::builder()
        .estimator(Arc::new(FixedEstimator(0.4)))
        .build()
        .unwrap();
    let corpus = r.rebuild_index(&shop());

    let res = r
        .retrieve_with("copper still", &corpus, 3, &RetrieveOptions::default())
        .unwrap();
    assert!(res.trace.gated.unwrap() > 0);
    assert!(res.selected.iter().all(|c| c.gate_score == Some(0.4)));
}

#[test]
fn test_without_estimator_uses_fused_pool() {
    let r = Retriever::builder().without_estimator().build().unwrap();
    let corpus = r.rebuild_index(&shop());
    assert!(!r.gating_enabled());

    let res = r
        .retrieve_with("copper still", &corpus, 3, &RetrieveOptions::default())
        .unwrap();
    assert_eq!(res.trace.gated, None);
    assert!(!res.trace.degraded());
    assert!(!res.selected.is_empty());
    assert!(res.selected.iter().all(|c| c.gate_score.is_none()));
}
