//! Property tests over arbitrary queries

use proptest::prelude::*;
use sift::{RetrieveOptions, Retriever, MAX_RESULTS};

use crate::common::*;

const WORDS: &[&str] = &[
    "copper", "still", "gallon", "10", "220v", "element", "price", "stock", "gasket", "reflux",
    "column", "keg", "$899", "how", "much", "?", "cheap", "controller",
];

fn query_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..8).prop_map(|w| w.join(" "))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn output_bounded_and_trailed(query in query_strategy(), n in 1usize..=MAX_RESULTS) {
        let r = Retriever::new();
        let mut corpus = shop();
        corpus.extend(long_corpus(8));
        let corpus = r.rebuild_index(&corpus);

        let res = r.retrieve_with(&query, &corpus, n, &RetrieveOptions::uncached()).unwrap();
        let format = &r.config().format;
        prop_assert!(res.text.chars().count() <= format.max_block_chars);
        prop_assert!(res.text.ends_with(&format.trailer));
        prop_assert!(res.selected.len() <= n);
    }

    #[test]
    fn cached_answer_matches_fresh_answer(query in query_strategy()) {
        let r = Retriever::new();
        let corpus = r.rebuild_index(&shop());

        let fresh = r.retrieve_with(&query, &corpus, 3, &RetrieveOptions::uncached()).unwrap();
        let first = r.retrieve(&query, &corpus, 3).unwrap();
        let second = r.retrieve(&query, &corpus, 3).unwrap();
        prop_assert_eq!(&fresh.text, &first);
        prop_assert_eq!(&first, &second);
    }
}
