//! Query-fusion retrieval.
//!
//! One structured generative call identifies up to `max_violation_terms`
//! suspicious terms in the input and produces `num_fusion_queries` short
//! search queries per term. All queries (plus the raw text) run against
//! the baseline retriever concurrently and merge via RRF. Any failure in
//! planning degrades to a single baseline query — retrieval never
//! hard-fails because of the fusion step.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use redline_core::config::AuditorConfig;
use redline_core::errors::{GenerationError, RedlineResult};
use redline_core::models::{Candidate, DegradationEvent};
use redline_core::traits::IGenerativeModel;

use super::retriever::VectorRetriever;
use super::rrf;

const STYLE_CATEGORIES: &str = "\
- Capitalization: case rules (titles, government, academic, business terms).
- Punctuation: ellipses, brackets, quotation marks, commas, hyphens.
- Spelling: preferred spellings, compound words, regional variants.
- Grammar: possessives, verb agreement, clause distinction.
- Numbers: digits vs text, measurements, currency, percentages.
- Dates & Time: months, years, days, time formatting.
- Geography: place names, regions, demonyms, location abbreviations.
- Titles & Ranks: military ranks, royal titles, job titles, honorifics.
- Abbreviations: acronyms, initialisms.
- Usage & Diction: word choice distinctions, jargon, redundancy.
- Proper Names: specific people, organizations, entities.
- Bias & Sensitivity: inclusive language, preferred terminology.";

/// Fusion retrieval over the baseline retriever.
pub struct FusionRetriever {
    base: Arc<VectorRetriever>,
    model: Arc<dyn IGenerativeModel>,
    config: Arc<AuditorConfig>,
    /// Shared request gate; the planning call holds a permit.
    gate: Arc<Semaphore>,
}

impl FusionRetriever {
    pub fn new(
        base: Arc<VectorRetriever>,
        model: Arc<dyn IGenerativeModel>,
        config: Arc<AuditorConfig>,
        gate: Arc<Semaphore>,
    ) -> Self {
        Self {
            base,
            model,
            config,
            gate,
        }
    }

    /// Retrieve with query fusion; returns the fused candidates and a
    /// degradation event when the planner failed and the raw query was
    /// used instead.
    pub async fn retrieve(
        &self,
        text: &str,
    ) -> RedlineResult<(Vec<Candidate>, Option<DegradationEvent>)> {
        let queries = match self.plan_queries(text).await {
            Ok(queries) if !queries.is_empty() => queries,
            Ok(_) => {
                debug!("fusion plan produced no queries, using raw text");
                let event = DegradationEvent::new(
                    "query_fusion",
                    "fusion plan produced no usable queries",
                    "single baseline query",
                );
                return Ok((self.base.retrieve(text).await?, Some(event)));
            }
            Err(e) => {
                warn!(error = %e, "fusion planning failed, using raw text");
                let event = DegradationEvent::new(
                    "query_fusion",
                    e.to_string(),
                    "single baseline query",
                );
                return Ok((self.base.retrieve(text).await?, Some(event)));
            }
        };

        debug!(queries = queries.len(), "issuing fused queries");

        // Concurrent fan-out with per-query error isolation: a failed
        // query contributes nothing instead of cancelling its siblings.
        let tasks = queries.iter().map(|q| self.base.retrieve(q));
        let mut lists = Vec::new();
        for (query, result) in queries.iter().zip(join_all(tasks).await) {
            match result {
                Ok(candidates) if !candidates.is_empty() => lists.push(candidates),
                Ok(_) => {}
                Err(e) => warn!(query = %query, error = %e, "fused query failed"),
            }
        }

        if lists.is_empty() {
            // Every fused query came back empty or failed; fall back to
            // the raw text so fusion cannot make retrieval worse.
            let event = DegradationEvent::new(
                "query_fusion",
                "all fused queries failed or returned nothing",
                "single baseline query",
            );
            return Ok((self.base.retrieve(text).await?, Some(event)));
        }

        let mut fused = rrf::fuse(&lists, self.config.rrf_k);
        fused.truncate(self.config.initial_retrieval_count);
        Ok((fused, None))
    }

    /// One structured call → flat query list (raw text first). Term and
    /// query counts are capped by config regardless of what the model
    /// returns.
    async fn plan_queries(&self, text: &str) -> RedlineResult<Vec<String>> {
        let prompt = fusion_prompt(
            text,
            self.config.max_violation_terms,
            self.config.num_fusion_queries,
        );
        let plan = {
            let _permit = self.gate.acquire().await.map_err(|e| {
                GenerationError::CompletionFailed {
                    reason: format!("request gate closed: {e}"),
                }
            })?;
            self.model.complete_fusion_plan(&prompt).await?
        };

        let mut queries = vec![text.to_string()];
        for term in plan.terms.iter().take(self.config.max_violation_terms) {
            for query in term.queries.iter().take(self.config.num_fusion_queries) {
                let query = query.trim();
                if !query.is_empty() && !queries.iter().any(|q| q == query) {
                    queries.push(query.to_string());
                }
            }
        }
        Ok(queries)
    }
}

/// Consolidated planning prompt: identifies terms AND generates their
/// queries in one call, which bounds fusion latency to a single round
/// trip.
fn fusion_prompt(text: &str, max_terms: usize, num_queries: usize) -> String {
    format!(
        "You are an expert copy editor. Analyze the following text and:\n\
         1. Identify up to {max_terms} specific terms that could potentially violate style rules.\n\
         2. For EACH term, generate {num_queries} specific search queries to find relevant rules.\n\n\
         Focus on these style categories:\n{STYLE_CATEGORIES}\n\n\
         Be specific; do NOT include generic phrases like \"style guide\" in queries.\n\n\
         Text: \"{text}\""
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_caps_and_text() {
        let prompt = fusion_prompt("the tarsands file", 5, 3);
        assert!(prompt.contains("up to 5 specific terms"));
        assert!(prompt.contains("generate 3 specific search queries"));
        assert!(prompt.contains("the tarsands file"));
    }
}
