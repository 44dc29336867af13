//! Property-based tests for the interval index and feature store.
//!
//! Every query is checked against a naive linear scan over the same intervals.

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use trackrs_overlaprs::{FeatureStore, IntervalIndex};

/// Closed intervals over a small coordinate space, so overlaps are common.
fn intervals() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((0..500u32, 0..60u32), 0..200)
        .prop_map(|v| v.into_iter().map(|(s, w)| (s, s + w)).collect())
}

fn query() -> impl Strategy<Value = (u32, u32)> {
    (0..600u32, 0..80u32).prop_map(|(s, w)| (s, s + w))
}

fn build(ivs: &[(u32, u32)]) -> IntervalIndex<u32, usize> {
    let mut index = IntervalIndex::with_capacity(ivs.len());
    for (i, (s, e)) in ivs.iter().enumerate() {
        index.add(*s, *e, i);
    }
    index.build();
    index
}

fn naive(ivs: &[(u32, u32)], start: u32, end: u32) -> Vec<usize> {
    ivs.iter()
        .enumerate()
        .filter(|(_, (s, e))| *s <= end && *e >= start)
        .map(|(i, _)| i)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn query_matches_naive_scan(ivs in intervals(), (start, end) in query()) {
        let index = build(&ivs);
        let mut got: Vec<usize> = index.query(start, end).into_iter().copied().collect();
        got.sort_unstable();
        prop_assert_eq!(got, naive(&ivs, start, end));
        prop_assert_eq!(index.count(start, end), naive(&ivs, start, end).len());
    }

    #[test]
    fn search_agrees_with_query(ivs in intervals(), (start, end) in query()) {
        let index = build(&ivs);
        let mut via_iter: Vec<usize> = index.search(start, end).map(|iv| *iv.val).collect();
        let mut via_query: Vec<usize> = index.query(start, end).into_iter().copied().collect();
        via_iter.sort_unstable();
        via_query.sort_unstable();
        prop_assert_eq!(via_iter, via_query);
    }

    #[test]
    fn full_span_returns_everything(ivs in intervals()) {
        let index = build(&ivs);
        prop_assert_eq!(index.query(0, u32::MAX).len(), ivs.len());
    }

    #[test]
    fn build_is_idempotent(ivs in intervals(), (start, end) in query()) {
        let mut index = build(&ivs);
        let mut first: Vec<usize> = index.query(start, end).into_iter().copied().collect();
        index.build();
        let mut second: Vec<usize> = index.query(start, end).into_iter().copied().collect();
        first.sort_unstable();
        second.sort_unstable();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn feature_store_matches_naive_scan(
        ivs in prop::collection::vec((0..3usize, 0..500u32, 0..60u32), 0..200),
        chrom in 0..4usize,
        (start, end) in query(),
    ) {
        let names = ["chr1", "chr2", "chr3", "chr4"];
        let mut store: FeatureStore<u32, usize> = FeatureStore::new();
        for (i, (c, s, w)) in ivs.iter().enumerate() {
            store.add(names[*c], *s, s + w, i);
        }
        store.build();

        let mut got: Vec<usize> = store
            .find_iter(names[chrom], start, end)
            .map(|iv| *iv.val)
            .collect();
        got.sort_unstable();

        let expected: Vec<usize> = ivs
            .iter()
            .enumerate()
            .filter(|(_, (c, s, w))| *c == chrom && *s <= end && s + w >= start)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(got, expected);
    }
}
