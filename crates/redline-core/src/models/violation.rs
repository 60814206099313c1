use serde::{Deserialize, Serialize};

/// A resolved style violation, mapped back onto the source paragraph.
///
/// Span invariant: when offsets are present,
/// `source_paragraph[start_index..end_index]` equals `text` exactly, or
/// equals it up to case when the case-insensitive fallback located the
/// span. Offsets are `None` when the quoted text could not be found.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Exact substring quoted by the model.
    pub text: String,
    /// Why this violates the rule.
    pub explanation: String,
    /// Correction, or "omit".
    pub suggested_fix: String,
    pub rule_id: String,
    pub rule_name: Option<String>,
    pub url: Option<String>,
    pub start_index: Option<usize>,
    pub end_index: Option<usize>,
    /// Paragraph the span indices refer to.
    pub source_paragraph: String,
}
