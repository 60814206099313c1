//! Property tests for the matchers and the rank fuser.

use std::collections::HashSet;

use proptest::prelude::*;

use redline_core::models::{Candidate, RuleTrigger, SourceType};
use redline_retrieval::search::rrf;
use redline_retrieval::sources::triggers::TriggerMatcher;

fn candidate(id: String) -> Candidate {
    Candidate {
        term: id.clone(),
        text: String::new(),
        url: String::new(),
        score: 0.0,
        source_type: SourceType::Vector,
        id,
    }
}

/// Small alphabet so triggers actually occur in generated text.
fn word() -> impl Strategy<Value = String> {
    "[abc]{1,4}"
}

proptest! {
    /// `find_matches` returns exactly the rules whose trigger occurs as
    /// a case-insensitive substring — verified against a brute-force
    /// scan.
    #[test]
    fn trigger_matching_equals_brute_force(
        text in "[abcABC ]{0,40}",
        triggers in proptest::collection::vec(word(), 1..8),
    ) {
        let trigger_records: Vec<RuleTrigger> = triggers
            .iter()
            .enumerate()
            .map(|(i, t)| RuleTrigger {
                trigger_text: t.clone(),
                rule_id: format!("R{i}"),
            })
            .collect();
        let matcher = TriggerMatcher::build(&trigger_records).unwrap();

        let found = matcher.find_matches(&text);

        let haystack = text.to_lowercase();
        let expected: HashSet<String> = trigger_records
            .iter()
            .filter(|t| haystack.contains(&t.trigger_text.to_lowercase()))
            .map(|t| t.rule_id.clone())
            .collect();

        prop_assert_eq!(found, expected);
    }

    /// Fused output is sorted by score descending and contains each
    /// input id exactly once.
    #[test]
    fn rrf_output_is_sorted_and_distinct(
        lists in proptest::collection::vec(
            proptest::collection::vec("[a-f]", 0..6),
            0..4,
        ),
    ) {
        let lists: Vec<Vec<Candidate>> = lists
            .into_iter()
            .map(|ids| {
                // Dedup within a list: a query never returns an id twice.
                let mut seen = HashSet::new();
                ids.into_iter()
                    .filter(|id| seen.insert(id.clone()))
                    .map(candidate)
                    .collect()
            })
            .collect();

        let fused = rrf::fuse(&lists, 60);

        let mut ids = HashSet::new();
        for window in fused.windows(2) {
            prop_assert!(window[0].score >= window[1].score);
        }
        for item in &fused {
            prop_assert!(ids.insert(item.id.clone()), "duplicate id in fused output");
            prop_assert!(item.score > 0.0);
        }

        let input_ids: HashSet<String> = lists
            .iter()
            .flatten()
            .map(|c| c.id.clone())
            .collect();
        prop_assert_eq!(ids, input_ids);
    }

    /// The order of the input lists never changes the fused ranking.
    #[test]
    fn rrf_is_invariant_under_list_permutation(
        a in proptest::collection::vec("[a-e]", 0..5),
        b in proptest::collection::vec("[a-e]", 0..5),
    ) {
        let dedup = |ids: Vec<String>| -> Vec<Candidate> {
            let mut seen = HashSet::new();
            ids.into_iter()
                .filter(|id| seen.insert(id.clone()))
                .map(candidate)
                .collect()
        };
        let list_a = dedup(a);
        let list_b = dedup(b);

        let forward = rrf::fuse(&[list_a.clone(), list_b.clone()], 60);
        let backward = rrf::fuse(&[list_b, list_a], 60);

        let ids = |fused: &[Candidate]| fused.iter().map(|c| c.id.clone()).collect::<Vec<_>>();
        prop_assert_eq!(ids(&forward), ids(&backward));
    }
}
