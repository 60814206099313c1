//! Property tests for the violation resolver.

use proptest::prelude::*;

use redline_agent::resolver;
use redline_core::models::Violation;

fn violation(text: String, span: Option<(usize, usize)>, paragraph: String) -> Violation {
    Violation {
        text,
        explanation: String::new(),
        suggested_fix: String::new(),
        rule_id: "rule-1".to_string(),
        rule_name: None,
        url: None,
        start_index: span.map(|(s, _)| s),
        end_index: span.map(|(_, e)| e),
        source_paragraph: paragraph,
    }
}

proptest! {
    /// dedup(dedup(x)) == dedup(x) for any violation list.
    #[test]
    fn dedup_is_idempotent(
        entries in proptest::collection::vec(
            ("[a-c ]{0,6}", proptest::option::of((0usize..10, 0usize..10)), "[xy]{0,3}"),
            0..12,
        ),
    ) {
        let input: Vec<Violation> = entries
            .into_iter()
            .map(|(text, span, paragraph)| violation(text, span, paragraph))
            .collect();

        let once = resolver::deduplicate(input);
        let twice = resolver::deduplicate(once.clone());

        prop_assert_eq!(once.len(), twice.len());
        for (a, b) in once.iter().zip(twice.iter()) {
            prop_assert_eq!(&a.text, &b.text);
            prop_assert_eq!(a.start_index, b.start_index);
        }
    }

    /// Dedup preserves first-appearance order.
    #[test]
    fn dedup_preserves_order(
        texts in proptest::collection::vec("[ab]{1,3}", 0..10),
    ) {
        let input: Vec<Violation> = texts
            .iter()
            .map(|t| violation(t.clone(), None, "p".to_string()))
            .collect();
        let deduped = resolver::deduplicate(input.clone());

        // Every output entry appears in the input, in the same relative
        // order as its first occurrence.
        let mut cursor = 0;
        for kept in &deduped {
            let position = input[cursor..]
                .iter()
                .position(|v| v.text == kept.text)
                .map(|p| p + cursor);
            prop_assert!(position.is_some());
            cursor = position.unwrap();
        }
    }

    /// A violation quoting a verbatim substring resolves to a span that
    /// slices back to exactly that substring.
    #[test]
    fn exact_substring_spans_slice_back(
        paragraph in "[a-d ]{1,30}",
        start in 0usize..30,
        len in 1usize..8,
    ) {
        let start = start.min(paragraph.len().saturating_sub(1));
        let end = (start + len).min(paragraph.len());
        prop_assume!(start < end);
        let snippet = &paragraph[start..end];

        let (found_start, found_end) = resolver::find_span(&paragraph, snippet).unwrap();
        prop_assert_eq!(&paragraph[found_start..found_end], snippet);
    }

    /// Normalization is idempotent.
    #[test]
    fn normalization_is_idempotent(text in ".{0,24}") {
        let once = resolver::normalize_text(&text);
        prop_assert_eq!(resolver::normalize_text(&once), once.clone());
    }
}
