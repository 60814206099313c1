use serde::{Deserialize, Serialize};

use super::defaults;
use crate::errors::ConfigError;

/// Per-run auditor configuration.
///
/// Constructed once per request by overlaying caller overrides on the
/// session defaults (see [`super::AuditOverrides`]), validated, then
/// frozen — every concurrent task reads the same snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditorConfig {
    /// Generative model identifier, passed through to the collaborator.
    pub model_name: String,
    pub temperature: f64,

    /// Candidates requested from the vector index per query.
    pub initial_retrieval_count: usize,
    /// Candidates kept after the rerank stage.
    pub final_top_k: usize,
    /// Lexical hits requested alongside dense hits in hybrid mode.
    pub sparse_top_k: usize,
    /// Candidates below this score are dropped after reranking.
    pub rerank_score_threshold: f64,
    /// Cap on the deduplicated candidate set handed to the agent.
    pub aggregated_rule_limit: usize,

    /// Hard cap on agent iterations. Never exceeded.
    pub max_agent_iterations: usize,
    /// Size of the semaphore gating in-flight collaborator calls.
    pub max_concurrent_requests: usize,

    /// Gathering source toggles.
    pub use_vector_source: bool,
    pub use_trigger_source: bool,
    pub use_pattern_source: bool,

    /// Query-fusion retrieval (term identification + per-term queries).
    pub use_query_fusion: bool,
    pub num_fusion_queries: usize,
    pub max_violation_terms: usize,

    /// Secondary semantic reranking pass.
    pub use_reranker: bool,

    /// RRF damping constant for fusing heterogeneous query results.
    pub rrf_k: u32,

    /// Confidence floor: when non-zero, a confident iteration with fewer
    /// candidates than this is overridden and more context is requested
    /// (only while iterations remain). Zero trusts the model.
    pub min_rules_for_confidence: usize,

    /// Ask the model to surface its reasoning in the `thinking` field.
    pub include_thinking: bool,
}

impl Default for AuditorConfig {
    fn default() -> Self {
        Self {
            model_name: defaults::DEFAULT_MODEL_NAME.to_string(),
            temperature: defaults::DEFAULT_TEMPERATURE,
            initial_retrieval_count: defaults::DEFAULT_INITIAL_RETRIEVAL_COUNT,
            final_top_k: defaults::DEFAULT_FINAL_TOP_K,
            sparse_top_k: defaults::DEFAULT_SPARSE_TOP_K,
            rerank_score_threshold: defaults::DEFAULT_RERANK_SCORE_THRESHOLD,
            aggregated_rule_limit: defaults::DEFAULT_AGGREGATED_RULE_LIMIT,
            max_agent_iterations: defaults::DEFAULT_MAX_AGENT_ITERATIONS,
            max_concurrent_requests: defaults::DEFAULT_MAX_CONCURRENT_REQUESTS,
            use_vector_source: true,
            use_trigger_source: true,
            use_pattern_source: true,
            use_query_fusion: true,
            num_fusion_queries: defaults::DEFAULT_NUM_FUSION_QUERIES,
            max_violation_terms: defaults::DEFAULT_MAX_VIOLATION_TERMS,
            use_reranker: true,
            rrf_k: defaults::DEFAULT_RRF_K,
            min_rules_for_confidence: 0,
            include_thinking: false,
        }
    }
}

impl AuditorConfig {
    /// Range-check tunable parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                reason: reason.into(),
            }
        }

        if self.model_name.is_empty() {
            return Err(invalid("model_name must be a non-empty string"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(invalid("temperature must be between 0.0 and 2.0"));
        }
        if !(10..=200).contains(&self.initial_retrieval_count) {
            return Err(invalid(
                "initial_retrieval_count must be between 10 and 200",
            ));
        }
        if !(5..=100).contains(&self.final_top_k) {
            return Err(invalid("final_top_k must be between 5 and 100"));
        }
        if !(0.0..=1.0).contains(&self.rerank_score_threshold) {
            return Err(invalid(
                "rerank_score_threshold must be between 0.0 and 1.0",
            ));
        }
        if !(10..=100).contains(&self.aggregated_rule_limit) {
            return Err(invalid("aggregated_rule_limit must be between 10 and 100"));
        }
        if !(1..=10).contains(&self.max_agent_iterations) {
            return Err(invalid("max_agent_iterations must be between 1 and 10"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(invalid("max_concurrent_requests must be at least 1"));
        }
        if !self.use_vector_source && !self.use_trigger_source && !self.use_pattern_source {
            return Err(invalid("at least one gathering source must be enabled"));
        }
        Ok(())
    }
}
