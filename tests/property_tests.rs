//! Property-based tests for docxr
//!
//! This module uses proptest to verify core invariants of the replacement
//! engine. Property-based testing generates hundreds of random inputs to
//! verify that certain properties always hold true.

use docxr::{MatchMode, MemoryDocument, PatternEntry, PatternSet, TextDocument, apply};

// Import proptest macro
use proptest::prelude::*;

fn set(pairs: &[(&str, &str)]) -> PatternSet {
    PatternSet::new(
        pairs
            .iter()
            .map(|(search, replacement)| PatternEntry {
                search: search.to_string(),
                replacement: replacement.to_string(),
            })
            .collect(),
    )
}

// ============================================================================
// Property 1: Literal mode replaces every occurrence
// ============================================================================

proptest! {
    /// After a literal pass, the search token is gone from every paragraph
    /// (the replacement never reintroduces it).
    #[test]
    fn prop_literal_replaces_all_occurrences(
        prefix in "[a-z ]{0,20}",
        suffix in "[a-z ]{0,20}",
        count in 1usize..8
    ) {
        let text = format!("{}{}{}", prefix, "TOKEN".repeat(count), suffix);
        let mut doc = MemoryDocument::with_paragraphs([text]);

        apply(&mut doc, &set(&[("TOKEN", "out")]), MatchMode::Literal).unwrap();

        prop_assert!(!doc.paragraphs()[0].contains("TOKEN"));
    }

    /// A literal set whose replacements contain no search key is a fixed
    /// point: the second pass changes nothing.
    #[test]
    fn prop_literal_mode_is_idempotent(
        paragraphs in prop::collection::vec("[a-z<>/ ]{0,40}", 1..6)
    ) {
        let patterns = set(&[("<c>", "[CENTER]"), ("<u>", "[UNDERLINE]"), ("</ff>", "[PAGE]")]);
        let mut doc = MemoryDocument::with_paragraphs(paragraphs);

        apply(&mut doc, &patterns, MatchMode::Literal).unwrap();
        let after_first = doc.paragraphs().to_vec();

        let second = apply(&mut doc, &patterns, MatchMode::Literal).unwrap();
        prop_assert_eq!(second.replacements_made, 0);
        prop_assert_eq!(doc.paragraphs().to_vec(), after_first);
    }

    /// replacements_made counts changed nodes, never matches.
    #[test]
    fn prop_count_equals_changed_nodes(
        paragraphs in prop::collection::vec("[a-z ]{0,30}", 1..10)
    ) {
        let changed_expected = paragraphs.iter().filter(|p| p.contains('a')).count();
        let mut doc = MemoryDocument::with_paragraphs(paragraphs);

        let result = apply(&mut doc, &set(&[("a", "4")]), MatchMode::Literal).unwrap();

        prop_assert_eq!(result.replacements_made, changed_expected);
        prop_assert_eq!(result.details.len(), changed_expected);
    }
}

// ============================================================================
// Property 2: Determinism
// ============================================================================

proptest! {
    /// Identical input documents produce byte-identical output and
    /// identical audit records on every run.
    #[test]
    fn prop_engine_is_deterministic(
        paragraphs in prop::collection::vec("[a-z0-9 ]{0,40}", 1..8)
    ) {
        let patterns = set(&[(r"\d+", "[{{match}}]"), ("a", "A")]);

        let mut doc1 = MemoryDocument::with_paragraphs(paragraphs.clone());
        let mut doc2 = MemoryDocument::with_paragraphs(paragraphs);

        let result1 = apply(&mut doc1, &patterns, MatchMode::Regex).unwrap();
        let result2 = apply(&mut doc2, &patterns, MatchMode::Regex).unwrap();

        prop_assert_eq!(doc1.paragraphs(), doc2.paragraphs());
        prop_assert_eq!(result1.replacements_made, result2.replacements_made);
        prop_assert_eq!(result1.details, result2.details);
    }
}

// ============================================================================
// Property 3: Regex placeholder interpolation
// ============================================================================

proptest! {
    /// `<word>` wrapped via a single capture group always becomes
    /// `<<word>>`, wherever it sits in the text.
    #[test]
    fn prop_capture_group_wraps_every_tag(
        words in prop::collection::vec("[a-z]{1,8}", 1..5)
    ) {
        let text: String = words.iter().map(|w| format!("<{w}>filler")).collect();
        let mut doc = MemoryDocument::with_paragraphs([text]);

        apply(&mut doc, &set(&[(r"<([a-z]+)>", "<<{{match}}>>")]), MatchMode::Regex).unwrap();

        let output = doc.paragraphs()[0].clone();
        for word in &words {
            let wrapped = format!("<<{word}>>");
            prop_assert!(output.contains(&wrapped));
        }
    }

    /// Without capture groups the placeholder receives the entire match,
    /// so bracketing digits preserves them all.
    #[test]
    fn prop_no_capture_placeholder_preserves_match(
        number in 0u64..1_000_000,
        prefix in "[a-z]{0,10}",
        suffix in "[a-z]{0,10}"
    ) {
        let mut doc = MemoryDocument::with_paragraphs([format!("{prefix}{number}{suffix}")]);

        apply(&mut doc, &set(&[(r"\d+", "[{{match}}]")]), MatchMode::Regex).unwrap();

        prop_assert_eq!(
            doc.paragraphs()[0].clone(),
            format!("{prefix}[{number}]{suffix}")
        );
    }
}

// ============================================================================
// Property 4: Traversal order is stable
// ============================================================================

proptest! {
    /// Audit records list body paragraphs before table nodes, each group
    /// in document order.
    #[test]
    fn prop_records_follow_traversal_order(
        body_count in 1usize..6,
        cell_count in 1usize..4
    ) {
        let paragraphs: Vec<String> = (0..body_count).map(|i| format!("x body {i}")).collect();
        let cells: Vec<Vec<String>> = (0..cell_count).map(|i| vec![format!("x cell {i}")]).collect();

        let mut doc = MemoryDocument::with_paragraphs(paragraphs);
        doc.add_table(vec![cells]);

        let result = apply(&mut doc, &set(&[("x", "y")]), MatchMode::Literal).unwrap();
        let expected_order: Vec<String> = doc.locations().iter().map(|l| l.to_string()).collect();
        let record_order: Vec<String> =
            result.details.iter().map(|r| r.location.clone()).collect();

        prop_assert_eq!(record_order, expected_order);
    }
}
