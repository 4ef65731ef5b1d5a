//! The replacement engine.
//!
//! Applies an ordered pattern set to every text node of a document, in the
//! fixed traversal order the [`TextDocument`] backend guarantees. Patterns
//! fold over the node text sequentially, so each pattern sees the cumulative
//! output of the ones before it. That cross-visibility is intentional:
//! overlapping legal tokens rely on it.

use crate::document::TextDocument;
use crate::pattern::{MatchMode, PatternSet};
use anyhow::{Context, Result};
use regex::{Captures, Regex};
use tracing::warn;

/// Placeholder in replacement templates that receives captured group text.
pub const MATCH_PLACEHOLDER: &str = "{{match}}";

/// Audit preview length for body paragraphs, in characters.
pub const PARAGRAPH_PREVIEW_CHARS: usize = 100;

/// Audit preview length for table-cell paragraphs, in characters.
/// Deliberately shorter than the paragraph preview; table cells are
/// displayed in a denser layout.
pub const TABLE_PREVIEW_CHARS: usize = 50;

/// Audit entry for one changed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRecord {
    /// Location path, e.g. `paragraph_4` or `table_0_row_1_cell_0_para_0`.
    pub location: String,
    /// Original text, truncated to the preview length.
    pub original: String,
    /// Modified text, truncated to the preview length.
    pub modified: String,
}

/// Per-document aggregate returned by [`apply`].
#[derive(Debug, Clone, Default)]
pub struct ProcessingResult {
    /// Number of nodes whose text changed (not the number of matches).
    pub replacements_made: usize,
    /// Audit entries in traversal order.
    pub details: Vec<ReplacementRecord>,
}

enum CompiledPattern<'a> {
    Literal {
        search: &'a str,
        replacement: &'a str,
    },
    Regex {
        regex: Regex,
        template: &'a str,
    },
    /// A pattern that failed to compile. It is skipped for the whole
    /// document; the remaining patterns still apply.
    Skipped,
}

/// Apply `set` to every text node of `doc`, writing back changed text.
///
/// A pattern that fails to compile is logged and skipped without aborting
/// the document. A failure to read or write a node is fatal for the
/// document and propagates to the caller; multi-document drivers are
/// expected to catch per document and continue.
pub fn apply(
    doc: &mut dyn TextDocument,
    set: &PatternSet,
    mode: MatchMode,
) -> Result<ProcessingResult> {
    let compiled = compile(set, mode);
    let mut result = ProcessingResult::default();

    for location in doc.locations() {
        let original = doc
            .node_text(&location)
            .with_context(|| format!("failed to read node {location}"))?;
        let modified = rewrite(&original, &compiled);

        if modified != original {
            doc.replace_node_text(&location, &modified)
                .with_context(|| format!("failed to write node {location}"))?;

            let limit = if location.in_table() {
                TABLE_PREVIEW_CHARS
            } else {
                PARAGRAPH_PREVIEW_CHARS
            };
            result.replacements_made += 1;
            result.details.push(ReplacementRecord {
                location: location.to_string(),
                original: preview(&original, limit),
                modified: preview(&modified, limit),
            });
        }
    }

    Ok(result)
}

/// Rewrite a single piece of text without touching any document. Exposed
/// for callers that want the fold semantics on raw strings.
pub fn rewrite_text(text: &str, set: &PatternSet, mode: MatchMode) -> String {
    rewrite(text, &compile(set, mode))
}

fn compile<'a>(set: &'a PatternSet, mode: MatchMode) -> Vec<CompiledPattern<'a>> {
    set.entries()
        .iter()
        .map(|entry| match mode {
            MatchMode::Literal => CompiledPattern::Literal {
                search: &entry.search,
                replacement: &entry.replacement,
            },
            MatchMode::Regex => match Regex::new(&entry.search) {
                Ok(regex) => CompiledPattern::Regex {
                    regex,
                    template: &entry.replacement,
                },
                Err(e) => {
                    warn!("skipping pattern '{}' that does not compile: {e}", entry.search);
                    CompiledPattern::Skipped
                }
            },
        })
        .collect()
}

fn rewrite(text: &str, patterns: &[CompiledPattern<'_>]) -> String {
    let mut current = text.to_string();

    for pattern in patterns {
        match pattern {
            CompiledPattern::Literal {
                search,
                replacement,
            } => {
                if current.contains(*search) {
                    current = current.replace(*search, *replacement);
                }
            }
            CompiledPattern::Regex { regex, template } => {
                current = if template.contains(MATCH_PLACEHOLDER) {
                    regex
                        .replace_all(&current, |caps: &Captures<'_>| interpolate(template, caps))
                        .into_owned()
                } else {
                    // No placeholder: hand the template to the regex engine
                    // so $1-style backreferences keep their native meaning.
                    regex.replace_all(&current, *template).into_owned()
                };
            }
            CompiledPattern::Skipped => {}
        }
    }

    current
}

/// Build the replacement for one match by filling `{{match}}` occurrences.
///
/// With capture groups, groups feed successive placeholder occurrences left
/// to right, one group each. Without capture groups, every placeholder
/// occurrence receives the entire match text.
fn interpolate(template: &str, caps: &Captures<'_>) -> String {
    let mut out = template.to_string();
    if caps.len() > 1 {
        for group in caps.iter().skip(1) {
            let text = group.map(|m| m.as_str()).unwrap_or("");
            out = out.replacen(MATCH_PLACEHOLDER, text, 1);
        }
    } else {
        out = out.replace(MATCH_PLACEHOLDER, &caps[0]);
    }
    out
}

fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::pattern::PatternEntry;

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

    #[test]
    fn test_literal_replaces_all_occurrences() {
        let mut doc = MemoryDocument::with_paragraphs(["<c>Hi<c>"]);
        let result = apply(&mut doc, &set(&[("<c>", "")]), MatchMode::Literal).unwrap();

        assert_eq!(doc.paragraphs()[0], "Hi");
        assert_eq!(result.replacements_made, 1);
    }

    #[test]
    fn test_literal_mode_does_not_interpolate_placeholder() {
        let mut doc = MemoryDocument::with_paragraphs(["token here"]);
        apply(&mut doc, &set(&[("token", "{{match}}")]), MatchMode::Literal).unwrap();
        assert_eq!(doc.paragraphs()[0], "{{match}} here");
    }

    #[test]
    fn test_literal_mode_is_idempotent_for_non_recursive_sets() {
        let patterns = set(&[("<c>", "<<CENTER>>"), ("<u>", "<<UNDERLINE>>")]);
        let mut doc = MemoryDocument::with_paragraphs(["<c>title<u>body"]);

        let first = apply(&mut doc, &patterns, MatchMode::Literal).unwrap();
        assert_eq!(first.replacements_made, 1);

        let second = apply(&mut doc, &patterns, MatchMode::Literal).unwrap();
        assert_eq!(second.replacements_made, 0);
        assert_eq!(doc.paragraphs()[0], "<<CENTER>>title<<UNDERLINE>>body");
    }

    #[test]
    fn test_order_sensitivity_earlier_output_visible_to_later_patterns() {
        let patterns = set(&[("A", "B"), ("B", "C")]);
        let mut doc = MemoryDocument::with_paragraphs(["A"]);
        apply(&mut doc, &patterns, MatchMode::Literal).unwrap();
        assert_eq!(doc.paragraphs()[0], "C");
    }

    #[test]
    fn test_capture_group_interpolation() {
        let patterns = set(&[(r"<(\w+)>", "<<{{match}}>>")]);
        let mut doc = MemoryDocument::with_paragraphs(["<i>text<u>"]);
        apply(&mut doc, &patterns, MatchMode::Regex).unwrap();
        assert_eq!(doc.paragraphs()[0], "<<i>>text<<u>>");
    }

    #[test]
    fn test_no_capture_placeholder_receives_whole_match() {
        let patterns = set(&[(r"\d+", "[{{match}}]")]);
        let mut doc = MemoryDocument::with_paragraphs(["abc123def"]);
        apply(&mut doc, &patterns, MatchMode::Regex).unwrap();
        assert_eq!(doc.paragraphs()[0], "abc[123]def");
    }

    #[test]
    fn test_multiple_placeholders_take_successive_groups() {
        let patterns = set(&[(r"(\w+)=(\w+)", "{{match}} is {{match}}")]);
        let mut doc = MemoryDocument::with_paragraphs(["key=value"]);
        apply(&mut doc, &patterns, MatchMode::Regex).unwrap();
        assert_eq!(doc.paragraphs()[0], "key is value");
    }

    #[test]
    fn test_regex_without_placeholder_uses_native_backreferences() {
        let patterns = set(&[(r"(\w+)@example\.com", "$1@company.org")]);
        let mut doc = MemoryDocument::with_paragraphs(["mail alice@example.com today"]);
        apply(&mut doc, &patterns, MatchMode::Regex).unwrap();
        assert_eq!(doc.paragraphs()[0], "mail alice@company.org today");
    }

    #[test]
    fn test_regex_substitution_is_global() {
        let patterns = set(&[(r"\d+", "N")]);
        let mut doc = MemoryDocument::with_paragraphs(["1 and 22 and 333"]);
        apply(&mut doc, &patterns, MatchMode::Regex).unwrap();
        assert_eq!(doc.paragraphs()[0], "N and N and N");
    }

    #[test]
    fn test_bad_pattern_is_skipped_but_rest_apply() {
        let patterns = set(&[("<c>(", "X"), ("foo", "bar"), ("baz", "qux")]);
        let mut doc = MemoryDocument::with_paragraphs(["foo baz"]);
        let result = apply(&mut doc, &patterns, MatchMode::Regex).unwrap();

        assert_eq!(doc.paragraphs()[0], "bar qux");
        assert_eq!(result.replacements_made, 1);
        assert_eq!(patterns.validate(MatchMode::Regex).len(), 1);
    }

    #[test]
    fn test_traversal_order_body_before_tables() {
        let mut doc = MemoryDocument::with_paragraphs(["P0 x", "P1 x"]);
        doc.add_table(vec![vec![vec!["T0 x".to_string()]]]);

        let result = apply(&mut doc, &set(&[("x", "y")]), MatchMode::Literal).unwrap();
        let locations: Vec<&str> = result.details.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(
            locations,
            vec!["paragraph_0", "paragraph_1", "table_0_row_0_cell_0_para_0"]
        );
    }

    #[test]
    fn test_count_is_per_node_not_per_match() {
        let mut doc = MemoryDocument::with_paragraphs(["x x x", "x", "no match"]);
        let result = apply(&mut doc, &set(&[("x", "y")]), MatchMode::Literal).unwrap();
        assert_eq!(result.replacements_made, 2);
        assert_eq!(result.details.len(), 2);
    }

    #[test]
    fn test_paragraph_preview_truncated_at_100_chars() {
        let original = format!("token{}", "a".repeat(145));
        let mut doc = MemoryDocument::with_paragraphs([original.clone()]);
        let result = apply(&mut doc, &set(&[("token", "tokex")]), MatchMode::Literal).unwrap();

        let record = &result.details[0];
        assert_eq!(record.original.chars().count(), 103);
        assert!(record.original.ends_with("..."));
        assert_eq!(
            record.original,
            original.chars().take(100).collect::<String>() + "..."
        );
    }

    #[test]
    fn test_table_preview_truncated_at_50_chars() {
        let original = format!("token{}", "b".repeat(55));
        let mut doc = MemoryDocument::with_paragraphs(Vec::<String>::new());
        doc.add_table(vec![vec![vec![original]]]);

        let result = apply(&mut doc, &set(&[("token", "tokex")]), MatchMode::Literal).unwrap();
        let record = &result.details[0];
        assert_eq!(record.original.chars().count(), 53);
        assert!(record.original.ends_with("..."));
    }

    #[test]
    fn test_short_text_is_not_truncated() {
        let mut doc = MemoryDocument::with_paragraphs(["short token"]);
        let result = apply(&mut doc, &set(&[("token", "text")]), MatchMode::Literal).unwrap();
        assert_eq!(result.details[0].original, "short token");
        assert_eq!(result.details[0].modified, "short text");
    }

    #[test]
    fn test_unchanged_document_produces_empty_result() {
        let mut doc = MemoryDocument::with_paragraphs(["nothing to do"]);
        let result = apply(&mut doc, &set(&[("absent", "x")]), MatchMode::Literal).unwrap();
        assert_eq!(result.replacements_made, 0);
        assert!(result.details.is_empty());
    }

    #[test]
    fn test_rewrite_text_matches_document_fold() {
        let patterns = set(&[("A", "B"), ("B", "C")]);
        assert_eq!(rewrite_text("A", &patterns, MatchMode::Literal), "C");
    }

    #[test]
    fn test_optional_unmatched_group_interpolates_empty() {
        let patterns = set(&[(r"PROMT(\w*)\(", "<<PROMPT_{{match}}(")]);
        let mut doc = MemoryDocument::with_paragraphs(["PROMT("]);
        apply(&mut doc, &patterns, MatchMode::Regex).unwrap();
        assert_eq!(doc.paragraphs()[0], "<<PROMPT_(");
    }
}
