use serde::{Deserialize, Serialize};

use crate::constants::{RULE_ID_HEX_LEN, RULE_ID_PREFIX};

/// Kind of check a rule expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    /// A mechanical, directly checkable rule ("use 'oilsands'").
    AtomicCheck,
    /// A judgement-requiring policy ("avoid jargon in ledes").
    ComplexPolicy,
}

/// Master record for a style guide rule. Immutable once ingested;
/// owned by the external catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Content-addressed id: blake3 of term + url + definition.
    /// Stable across re-ingestion, which is what makes per-query
    /// result caching safe.
    pub id: String,
    pub term: String,
    pub definition: String,
    pub url: String,
    pub tags: Vec<String>,
    pub rule_type: RuleType,
}

impl StyleRule {
    /// Build a rule, deriving the content-addressed id.
    pub fn new(
        term: impl Into<String>,
        definition: impl Into<String>,
        url: impl Into<String>,
        tags: Vec<String>,
        rule_type: RuleType,
    ) -> Self {
        let term = term.into();
        let definition = definition.into();
        let url = url.into();
        let id = Self::compute_id(&term, &url, &definition);
        Self {
            id,
            term,
            definition,
            url,
            tags,
            rule_type,
        }
    }

    /// Deterministic rule id from identity fields. Same inputs always
    /// produce the same id.
    pub fn compute_id(term: &str, url: &str, definition: &str) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(term.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(url.as_bytes());
        hasher.update(&[0x1f]);
        hasher.update(definition.as_bytes());
        let hex = hasher.finalize().to_hex();
        format!("{RULE_ID_PREFIX}{}", &hex.as_str()[..RULE_ID_HEX_LEN])
    }
}

/// An exact phrase whose presence in text proposes its rule as a
/// candidate. Many triggers may point at one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTrigger {
    pub trigger_text: String,
    pub rule_id: String,
}

/// A regex whose match in text proposes its rule as a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulePattern {
    pub pattern_regex: String,
    pub rule_id: String,
}
