//! Maps raw model violations back onto source-text offsets and
//! deduplicates across iterations and documents.

use std::collections::{HashMap, HashSet};

use redline_core::models::{Candidate, ReportedViolation, Violation};

/// Locate `snippet` inside `paragraph`.
///
/// Tries an exact match first, then a case-insensitive fallback. The
/// fallback index comes from the lower-cased strings, so it is only
/// reported when it maps back onto char boundaries of the original and
/// the original slice matches up to case — lower-casing is not
/// length-preserving for every scalar value.
pub fn find_span(paragraph: &str, snippet: &str) -> Option<(usize, usize)> {
    if snippet.is_empty() {
        return None;
    }
    if let Some(start) = paragraph.find(snippet) {
        return Some((start, start + snippet.len()));
    }

    let lower_paragraph = paragraph.to_lowercase();
    let lower_snippet = snippet.to_lowercase();
    let start = lower_paragraph.find(&lower_snippet)?;
    let end = start + snippet.len();

    if end <= paragraph.len()
        && paragraph.is_char_boundary(start)
        && paragraph.is_char_boundary(end)
        && paragraph[start..end].to_lowercase() == lower_snippet
    {
        Some((start, end))
    } else {
        None
    }
}

/// Lower-case and keep only alphanumerics and whitespace, trimmed.
/// The comparison form used for dedup keys. Lower-casing happens before
/// the filter so multi-char lowercase expansions cannot reintroduce
/// marks the filter would strip on a second pass — the function is
/// idempotent.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve raw model violations against their paragraph: locate spans,
/// and fill in rule metadata from the candidate map when the model
/// omitted it. Violations quoting empty text are dropped; unlocatable
/// spans are kept with `None` offsets.
pub fn resolve(
    reported: &[ReportedViolation],
    paragraph: &str,
    candidates: &[Candidate],
) -> Vec<Violation> {
    let by_id: HashMap<&str, &Candidate> =
        candidates.iter().map(|c| (c.id.as_str(), c)).collect();

    reported
        .iter()
        .filter_map(|raw| {
            let text = raw.text.trim();
            if text.is_empty() {
                return None;
            }
            let span = find_span(paragraph, text);
            let meta = by_id.get(raw.rule_id.as_str());

            let rule_name = raw
                .rule_name
                .clone()
                .or_else(|| meta.map(|c| c.term.clone()));
            let url = raw
                .url
                .clone()
                .filter(|u| !u.is_empty())
                .or_else(|| meta.map(|c| c.url.clone()).filter(|u| !u.is_empty()));

            Some(Violation {
                text: text.to_string(),
                explanation: raw.explanation.clone(),
                suggested_fix: raw.suggested_fix.clone(),
                rule_id: raw.rule_id.clone(),
                rule_name,
                url,
                start_index: span.map(|(s, _)| s),
                end_index: span.map(|(_, e)| e),
                source_paragraph: paragraph.to_string(),
            })
        })
        .collect()
}

/// Deduplicate violations by (normalized text, span, paragraph).
///
/// First occurrence wins; order is preserved; the operation is
/// idempotent. Entries whose text normalizes to nothing are dropped.
pub fn deduplicate(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen: HashSet<(String, Option<usize>, Option<usize>, String)> = HashSet::new();
    let mut deduplicated = Vec::with_capacity(violations.len());

    for violation in violations {
        let normalized = normalize_text(&violation.text);
        if normalized.is_empty() {
            continue;
        }
        let key = (
            normalized,
            violation.start_index,
            violation.end_index,
            violation.source_paragraph.clone(),
        );
        if seen.insert(key) {
            deduplicated.push(violation);
        }
    }

    deduplicated
}
