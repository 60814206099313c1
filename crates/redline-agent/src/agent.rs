//! The iterative, confidence-gated audit loop.
//!
//! States per paragraph: AUDITING → { CONFIDENT, NEEDS_CONTEXT } → DONE,
//! bounded by `max_agent_iterations`. The model's own output (confidence,
//! follow-up queries) decides whether the loop continues; a generation
//! failure stops the loop and keeps whatever was already collected.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use futures::future::join_all;
use regex::Regex;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use redline_core::config::AuditorConfig;
use redline_core::constants::{MAX_ADDITIONAL_QUERIES, MAX_KEYWORD_QUERIES};
use redline_core::models::{Candidate, IterationTrace, Violation};
use redline_core::traits::IGenerativeModel;
use redline_retrieval::VectorRetriever;

use crate::prompts;
use crate::resolver;

/// What one agent run produced.
#[derive(Debug, Default)]
pub struct AgentOutcome {
    pub violations: Vec<Violation>,
    pub iterations: Vec<IterationTrace>,
}

/// Drives the audit loop for a single paragraph.
pub struct AuditAgent {
    model: Arc<dyn IGenerativeModel>,
    /// Baseline retriever only — additional-context queries never go
    /// through fusion again.
    retriever: Arc<VectorRetriever>,
    config: Arc<AuditorConfig>,
    /// Shared request gate; every generative call holds a permit.
    gate: Arc<Semaphore>,
}

impl AuditAgent {
    pub fn new(
        model: Arc<dyn IGenerativeModel>,
        retriever: Arc<VectorRetriever>,
        config: Arc<AuditorConfig>,
        gate: Arc<Semaphore>,
    ) -> Self {
        Self {
            model,
            retriever,
            config,
            gate,
        }
    }

    /// Run the loop. Never fails: errors end the loop early with the
    /// violations collected so far.
    pub async fn audit(&self, paragraph: &str, candidates: Vec<Candidate>) -> AgentOutcome {
        if candidates.is_empty() {
            // Nothing to audit against; the model is not consulted.
            debug!("no candidates gathered, skipping audit loop");
            return AgentOutcome::default();
        }

        let limit = self.config.aggregated_rule_limit;
        let max_iterations = self.config.max_agent_iterations;
        let mut contexts = dedup_by_id(candidates);
        contexts.truncate(limit);

        let mut violations: Vec<Violation> = Vec::new();
        let mut traces = Vec::new();

        for iteration in 0..max_iterations {
            debug!(
                iteration = iteration + 1,
                of = max_iterations,
                rules = contexts.len(),
                "audit iteration"
            );

            let prompt = prompts::audit_prompt(
                paragraph,
                &contexts,
                &violations,
                iteration,
                self.config.include_thinking,
            );

            let result = match self.gated_complete_audit(&prompt).await {
                Ok(result) => result,
                Err(e) => {
                    error!(iteration, error = %e, "audit iteration failed, stopping loop");
                    traces.push(IterationTrace {
                        iteration,
                        violation_count: 0,
                        confident: false,
                        needs_more_context: false,
                        additional_queries: Vec::new(),
                        error: Some(e.to_string()),
                    });
                    break;
                }
            };

            let resolved = resolver::resolve(&result.violations, paragraph, &contexts);
            violations.extend(resolved);

            let mut confident = result.confident;
            let mut needs_more_context = result.needs_more_context;
            let mut queries: Vec<String> = result
                .additional_queries
                .iter()
                .map(|q| q.trim().to_string())
                .filter(|q| !q.is_empty())
                .take(MAX_ADDITIONAL_QUERIES)
                .collect();

            // Explicit confidence-floor policy: a confident verdict over
            // too few rules is overridden while iterations remain.
            let floor = self.config.min_rules_for_confidence;
            if confident
                && !needs_more_context
                && floor > 0
                && contexts.len() < floor
                && iteration + 1 < max_iterations
            {
                warn!(
                    rules = contexts.len(),
                    floor, "confident verdict below rule floor, requesting more context"
                );
                confident = false;
                needs_more_context = true;
                if queries.is_empty() {
                    queries = keyword_queries(paragraph);
                }
            }

            traces.push(IterationTrace {
                iteration,
                violation_count: result.violations.len(),
                confident,
                needs_more_context,
                additional_queries: queries.clone(),
                error: None,
            });

            if confident && !needs_more_context {
                info!(iteration = iteration + 1, "agent confident, stopping");
                break;
            }
            if iteration + 1 >= max_iterations {
                debug!("iteration cap reached");
                break;
            }
            if queries.is_empty() {
                // Not confident but nothing left to fetch; more passes
                // would see identical context.
                break;
            }

            let extra = self.fetch_additional_context(&queries).await;
            debug!(fetched = extra.len(), "merged additional context");
            contexts = merge_contexts(contexts, extra, limit);
        }

        AgentOutcome {
            violations: resolver::deduplicate(violations),
            iterations: traces,
        }
    }

    async fn gated_complete_audit(
        &self,
        prompt: &str,
    ) -> redline_core::errors::RedlineResult<redline_core::models::AuditIterationResult> {
        let _permit = self.gate.acquire().await.map_err(|e| {
            redline_core::errors::GenerationError::CompletionFailed {
                reason: format!("request gate closed: {e}"),
            }
        })?;
        self.model.complete_audit(prompt).await
    }

    /// Fetch more candidates per query, concurrently, with per-query
    /// error isolation.
    async fn fetch_additional_context(&self, queries: &[String]) -> Vec<Candidate> {
        let tasks = queries.iter().map(|q| self.retriever.retrieve(q));
        let mut fetched = Vec::new();
        for (query, result) in queries.iter().zip(join_all(tasks).await) {
            match result {
                Ok(candidates) => fetched.extend(candidates),
                Err(e) => warn!(query = %query, error = %e, "additional-context query failed"),
            }
        }
        fetched
    }
}

fn dedup_by_id(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen.insert(c.id.clone()))
        .collect()
}

/// Merge new candidates into the existing set, first occurrence wins,
/// capped again at the rule limit.
fn merge_contexts(
    existing: Vec<Candidate>,
    extra: Vec<Candidate>,
    limit: usize,
) -> Vec<Candidate> {
    let mut merged = existing;
    let mut seen: HashSet<String> = merged.iter().map(|c| c.id.clone()).collect();
    for candidate in extra {
        if seen.insert(candidate.id.clone()) {
            merged.push(candidate);
        }
    }
    merged.truncate(limit);
    merged
}

/// Capitalized phrases, the keyword queries used when the confidence
/// floor overrides the model and it supplied no queries of its own.
static KEYWORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").unwrap());

fn keyword_queries(paragraph: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    KEYWORD_RE
        .find_iter(paragraph)
        .map(|m| m.as_str().to_string())
        .filter(|k| seen.insert(k.clone()))
        .take(MAX_KEYWORD_QUERIES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_queries_capture_capitalized_phrases() {
        let queries = keyword_queries("The Alberta Government met in Fort McMurray today.");
        assert!(queries.contains(&"Alberta Government".to_string()));
        assert!(queries.len() <= MAX_KEYWORD_QUERIES);
    }

    #[test]
    fn merge_caps_and_prefers_existing() {
        let a = |id: &str| Candidate {
            id: id.to_string(),
            term: id.to_string(),
            text: String::new(),
            url: String::new(),
            score: 0.0,
            source_type: redline_core::models::SourceType::Vector,
        };
        let merged = merge_contexts(vec![a("x"), a("y")], vec![a("y"), a("z"), a("w")], 3);
        let ids: Vec<_> = merged.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["x", "y", "z"]);
    }
}
