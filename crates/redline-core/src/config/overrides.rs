use serde::{Deserialize, Serialize};

use super::AuditorConfig;

/// Caller-supplied tuning overrides for a single run.
///
/// Every field is optional; unset fields keep the session default. The
/// overlay produces a fresh [`AuditorConfig`] snapshot — the base config
/// is never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditOverrides {
    pub model_name: Option<String>,
    pub temperature: Option<f64>,
    pub initial_retrieval_count: Option<usize>,
    pub final_top_k: Option<usize>,
    pub sparse_top_k: Option<usize>,
    pub rerank_score_threshold: Option<f64>,
    pub aggregated_rule_limit: Option<usize>,
    pub max_agent_iterations: Option<usize>,
    pub max_concurrent_requests: Option<usize>,
    pub use_vector_source: Option<bool>,
    pub use_trigger_source: Option<bool>,
    pub use_pattern_source: Option<bool>,
    pub use_query_fusion: Option<bool>,
    pub num_fusion_queries: Option<usize>,
    pub max_violation_terms: Option<usize>,
    pub use_reranker: Option<bool>,
    pub rrf_k: Option<u32>,
    pub min_rules_for_confidence: Option<usize>,
    pub include_thinking: Option<bool>,
}

impl AuditorConfig {
    /// Overlay `overrides` on `self`, returning the frozen per-run snapshot.
    pub fn with_overrides(&self, overrides: &AuditOverrides) -> AuditorConfig {
        fn pick<T: Clone>(over: &Option<T>, base: &T) -> T {
            over.as_ref().cloned().unwrap_or_else(|| base.clone())
        }

        AuditorConfig {
            model_name: pick(&overrides.model_name, &self.model_name),
            temperature: pick(&overrides.temperature, &self.temperature),
            initial_retrieval_count: pick(
                &overrides.initial_retrieval_count,
                &self.initial_retrieval_count,
            ),
            final_top_k: pick(&overrides.final_top_k, &self.final_top_k),
            sparse_top_k: pick(&overrides.sparse_top_k, &self.sparse_top_k),
            rerank_score_threshold: pick(
                &overrides.rerank_score_threshold,
                &self.rerank_score_threshold,
            ),
            aggregated_rule_limit: pick(
                &overrides.aggregated_rule_limit,
                &self.aggregated_rule_limit,
            ),
            max_agent_iterations: pick(&overrides.max_agent_iterations, &self.max_agent_iterations),
            max_concurrent_requests: pick(
                &overrides.max_concurrent_requests,
                &self.max_concurrent_requests,
            ),
            use_vector_source: pick(&overrides.use_vector_source, &self.use_vector_source),
            use_trigger_source: pick(&overrides.use_trigger_source, &self.use_trigger_source),
            use_pattern_source: pick(&overrides.use_pattern_source, &self.use_pattern_source),
            use_query_fusion: pick(&overrides.use_query_fusion, &self.use_query_fusion),
            num_fusion_queries: pick(&overrides.num_fusion_queries, &self.num_fusion_queries),
            max_violation_terms: pick(&overrides.max_violation_terms, &self.max_violation_terms),
            use_reranker: pick(&overrides.use_reranker, &self.use_reranker),
            rrf_k: pick(&overrides.rrf_k, &self.rrf_k),
            min_rules_for_confidence: pick(
                &overrides.min_rules_for_confidence,
                &self.min_rules_for_confidence,
            ),
            include_thinking: pick(&overrides.include_thinking, &self.include_thinking),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_overrides_keep_defaults() {
        let base = AuditorConfig::default();
        let run = base.with_overrides(&AuditOverrides::default());
        assert_eq!(run.final_top_k, base.final_top_k);
        assert_eq!(run.model_name, base.model_name);
    }

    #[test]
    fn set_fields_replace_base_values() {
        let base = AuditorConfig::default();
        let overrides = AuditOverrides {
            max_agent_iterations: Some(1),
            use_query_fusion: Some(false),
            ..Default::default()
        };
        let run = base.with_overrides(&overrides);
        assert_eq!(run.max_agent_iterations, 1);
        assert!(!run.use_query_fusion);
        // Base is untouched.
        assert_ne!(base.max_agent_iterations, 1);
    }
}
