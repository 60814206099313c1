use serde::{Deserialize, Serialize};

/// A violation as emitted by the generative model, before span
/// resolution and metadata enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedViolation {
    /// Exact substring from the paragraph that violates the rule.
    pub text: String,
    /// Why this violates the rule, citing the guideline.
    pub explanation: String,
    /// Correction or "omit".
    pub suggested_fix: String,
    /// Reference id of the cited candidate.
    pub rule_id: String,
    #[serde(default)]
    pub rule_name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Typed result of one agent iteration. Superseded each loop pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditIterationResult {
    /// Model reasoning, present only when requested.
    #[serde(default)]
    pub thinking: Option<String>,
    #[serde(default)]
    pub violations: Vec<ReportedViolation>,
    /// True when the model is certain about its findings.
    #[serde(default)]
    pub confident: bool,
    /// True when the model wants more rules before concluding.
    #[serde(default)]
    pub needs_more_context: bool,
    /// Queries to find the missing rules.
    #[serde(default)]
    pub additional_queries: Vec<String>,
}

/// One term flagged by the fusion planner, with its search queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionTerm {
    pub term: String,
    #[serde(default)]
    pub queries: Vec<String>,
}

/// Output of the single structured fusion-planning call: up to
/// `max_violation_terms` terms, each with `num_fusion_queries` queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FusionPlan {
    #[serde(default)]
    pub terms: Vec<FusionTerm>,
}
