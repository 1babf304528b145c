//! Result and stage cache behaviour through the facade

use std::sync::Arc;

use sift::{
    CacheOutcome, CacheTier, InMemorySharedStore, RetrieveOptions, Retriever, SharedStore,
};

use crate::common::*;

#[test]
fn test_repeat_query_served_from_memory() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    let opts = RetrieveOptions::default();

    let first = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    let second = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();

    assert_eq!(first.trace.cache, CacheOutcome::Miss);
    assert_eq!(second.trace.cache, CacheOutcome::Hit(CacheTier::Memory));
    assert_eq!(first.text, second.text);
    assert!(second.selected.is_empty());

    let stats = r.cache_stats();
    assert_eq!(stats.memory_hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_query_spelling_variants_share_entry() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    let opts = RetrieveOptions::default();

    r.retrieve_with("Copper Still?", &corpus, 3, &opts).unwrap();
    let again = r.retrieve_with("  copper   STILL ", &corpus, 3, &opts).unwrap();
    assert_eq!(again.trace.cache, CacheOutcome::Hit(CacheTier::Memory));
}

#[test]
fn test_result_count_is_part_of_key_but_pool_is_shared() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    let opts = RetrieveOptions::default();

    let three = r.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    let one = r.retrieve_with("copper still", &corpus, 1, &opts).unwrap();

    assert_eq!(one.trace.cache, CacheOutcome::Miss);
    assert!(one.trace.stage_cache_hit);
    assert!(one.selected.len() <= 1);
    assert_eq!(one.selected.first(), three.selected.first());
}

#[test]
fn test_bypass_neither_reads_nor_writes() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());

    let bypassed = r
        .retrieve_with("copper still", &corpus, 3, &RetrieveOptions::uncached())
        .unwrap();
    assert_eq!(bypassed.trace.cache, CacheOutcome::Bypassed);

    let normal = r
        .retrieve_with("copper still", &corpus, 3, &RetrieveOptions::default())
        .unwrap();
    assert_eq!(normal.trace.cache, CacheOutcome::Miss);
    assert_eq!(normal.text, bypassed.text);
}

#[test]
fn test_clear_cache_forces_recompute() {
    let r = Retriever::new();
    let corpus = r.rebuild_index(&shop());
    let opts = RetrieveOptions::default();

    r.retrieve_with("gasket", &corpus, 2, &opts).unwrap();
    r.clear_cache();
    let res = r.retrieve_with("gasket", &corpus, 2, &opts).unwrap();
    assert_eq!(res.trace.cache, CacheOutcome::Miss);
    assert!(!res.trace.stage_cache_hit);
}

#[test]
fn test_shared_store_serves_other_retriever() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemorySharedStore::new());
    let a = Retriever::builder().shared_store(store.clone()).build().unwrap();
    let b = Retriever::builder().shared_store(store).build().unwrap();
    let ca = a.rebuild_index(&shop());
    let cb = b.rebuild_index(&shop());
    assert_eq!(ca.fingerprint(), cb.fingerprint());

    let opts = RetrieveOptions::default();
    let written = a.retrieve_with("copper still", &ca, 3, &opts).unwrap();
    let read = b.retrieve_with("copper still", &cb, 3, &opts).unwrap();

    assert_eq!(read.trace.cache, CacheOutcome::Hit(CacheTier::Shared));
    assert_eq!(read.text, written.text);
    assert_eq!(b.cache_stats().shared_hits, 1);
}

#[test]
fn test_shared_store_keeps_corpora_apart() {
    let store = Arc::new(InMemorySharedStore::new());
    let a = Retriever::builder().shared_store(store.clone()).build().unwrap();
    let b = Retriever::builder().shared_store(store.clone()).build().unwrap();
    let ca = a.rebuild_index(&priced_still("$499"));
    let cb = b.rebuild_index(&priced_still("$777"));
    // Both cells hand out the same local version
    assert_eq!(ca.version(), cb.version());

    let opts = RetrieveOptions::default();
    let from_a = a.retrieve_with("copper still", &ca, 3, &opts).unwrap();
    let from_b = b.retrieve_with("copper still", &cb, 3, &opts).unwrap();

    assert!(from_a.text.contains("$499"));
    assert_eq!(from_b.trace.cache, CacheOutcome::Miss);
    assert!(from_b.text.contains("$777"));
    assert!(!from_b.text.contains("$499"));
    assert_eq!(b.cache_stats().shared_hits, 0);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_restarted_retriever_reuses_only_matching_corpus() {
    let store = Arc::new(InMemorySharedStore::new());
    let opts = RetrieveOptions::default();
    {
        let first = Retriever::builder().shared_store(store.clone()).build().unwrap();
        let corpus = first.rebuild_index(&priced_still("$499"));
        first.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    }

    // Same content after a restart: served from the shared tier
    let same = Retriever::builder().shared_store(store.clone()).build().unwrap();
    let corpus = same.rebuild_index(&priced_still("$499"));
    let res = same.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    assert_eq!(res.trace.cache, CacheOutcome::Hit(CacheTier::Shared));

    // Changed content under the same version: recomputed
    let changed = Retriever::builder().shared_store(store).build().unwrap();
    let corpus = changed.rebuild_index(&priced_still("$777"));
    assert_eq!(corpus.version(), 1);
    let res = changed.retrieve_with("copper still", &corpus, 3, &opts).unwrap();
    assert_eq!(res.trace.cache, CacheOutcome::Miss);
    assert!(res.text.contains("$777"));
}

#[test]
fn test_shared_store_keeps_configurations_apart() {
    let store: Arc<dyn SharedStore> = Arc::new(InMemorySharedStore::new());
    let a = Retriever::builder().shared_store(store.clone()).build().unwrap();
    let b = Retriever::builder()
        .without_estimator()
        .shared_store(store)
        .build()
        .unwrap();
    let ca = a.rebuild_index(&shop());
    let cb = b.rebuild_index(&shop());

    let opts = RetrieveOptions::default();
    a.retrieve_with("copper still", &ca, 3, &opts).unwrap();
    let res = b.retrieve_with("copper still", &cb, 3, &opts).unwrap();
    assert_eq!(res.trace.cache, CacheOutcome::Miss);
}
