use serde::{Deserialize, Serialize};

use super::rule::StyleRule;

/// Which retrieval path proposed a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Vector,
    Trigger,
    Pattern,
    Reranked,
}

/// Vector-index query mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Dense + lexical. The only mode the pipeline uses.
    #[default]
    Hybrid,
    Dense,
    Sparse,
}

/// One scored hit from the vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexHit {
    pub id: String,
    pub term: String,
    /// Display guideline text.
    pub text: String,
    pub url: String,
    pub score: f64,
}

/// A style rule proposed as relevant to a piece of text by some source.
///
/// Ephemeral and per-request: created by a source module, consumed by the
/// fuser/reranker/agent, discarded at the end of the request. The id (the
/// rule id) is the dedup key within a gathering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub term: String,
    /// Display guideline text shown to the model.
    pub text: String,
    pub url: String,
    pub score: f64,
    pub source_type: SourceType,
}

impl Candidate {
    pub fn from_hit(hit: IndexHit, source_type: SourceType) -> Self {
        Self {
            id: hit.id,
            term: hit.term,
            text: hit.text,
            url: hit.url,
            score: hit.score,
            source_type,
        }
    }

    /// A candidate resolved from the catalog for an unscored source
    /// (trigger or pattern match).
    pub fn from_rule(rule: &StyleRule, source_type: SourceType) -> Self {
        Self {
            id: rule.id.clone(),
            term: rule.term.clone(),
            text: rule.definition.clone(),
            url: rule.url.clone(),
            score: 0.0,
            source_type,
        }
    }
}
