//! Concurrent candidate gathering across the enabled sources.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use redline_core::errors::{RedlineResult, RetrievalError};
use redline_core::models::{
    Candidate, DegradationEvent, GatherReport, SourceReport, SourceType,
};
use redline_core::traits::IRuleCatalog;

use crate::sources::{RuleSource, SourceOutcome};

/// Everything one gathering pass produced.
#[derive(Debug, Default)]
pub struct GatherOutcome {
    /// Deduplicated candidates, scored sources first.
    pub candidates: Vec<Candidate>,
    pub report: GatherReport,
    pub degradations: Vec<DegradationEvent>,
}

/// Fans the enabled sources out concurrently and merges their results.
///
/// Each source is isolated: an error degrades that source to an empty
/// result and the pass continues. Only when every source fails does the
/// pass fail as a whole.
pub struct RuleGatherer {
    sources: Vec<Arc<dyn RuleSource>>,
    catalog: Arc<dyn IRuleCatalog>,
}

impl RuleGatherer {
    pub fn new(sources: Vec<Arc<dyn RuleSource>>, catalog: Arc<dyn IRuleCatalog>) -> Self {
        Self { sources, catalog }
    }

    /// Run all sources against `text` and return the deduplicated
    /// candidate set plus per-source timing metadata.
    pub async fn gather(&self, text: &str) -> RedlineResult<GatherOutcome> {
        if self.sources.is_empty() {
            return Ok(GatherOutcome::default());
        }

        let mut tasks: JoinSet<(String, u64, RedlineResult<SourceOutcome>)> = JoinSet::new();
        for source in &self.sources {
            let source = Arc::clone(source);
            let text = text.to_string();
            tasks.spawn(async move {
                let started = Instant::now();
                let result = source.gather(&text).await;
                (
                    source.name().to_string(),
                    started.elapsed().as_millis() as u64,
                    result,
                )
            });
        }

        let mut outcomes: Vec<(String, SourceOutcome)> = Vec::new();
        let mut reports = Vec::new();
        let mut degradations = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, elapsed_ms, Ok(outcome))) => {
                    if let Some(event) = &outcome.degradation {
                        degradations.push(event.clone());
                    }
                    reports.push(SourceReport {
                        source: name.clone(),
                        candidate_count: outcome.candidates.len() + outcome.rule_ids.len(),
                        elapsed_ms,
                        degraded: false,
                    });
                    outcomes.push((name, outcome));
                }
                Ok((name, elapsed_ms, Err(e))) => {
                    warn!(source = %name, error = %e, "gathering source failed, degrading to empty");
                    degradations.push(DegradationEvent::new(
                        format!("source:{name}"),
                        e.to_string(),
                        "empty result",
                    ));
                    reports.push(SourceReport {
                        source: name.clone(),
                        candidate_count: 0,
                        elapsed_ms,
                        degraded: true,
                    });
                    failures.push(format!("{name}: {e}"));
                }
                Err(e) => {
                    warn!(error = %e, "gathering task aborted");
                    failures.push(format!("task aborted: {e}"));
                }
            }
        }

        if outcomes.is_empty() {
            return Err(RetrievalError::AllSourcesFailed { reasons: failures }.into());
        }

        // Stable merge and report order: sources finish in arbitrary order.
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));
        reports.sort_by(|a, b| a.source.cmp(&b.source));

        let (candidates, resolve_degradation) = self.merge(outcomes).await;
        if let Some(event) = resolve_degradation {
            degradations.push(event);
        }

        debug!(candidates = candidates.len(), "gathering pass complete");
        Ok(GatherOutcome {
            report: GatherReport {
                deduplicated_count: candidates.len(),
                sources: reports,
            },
            candidates,
            degradations,
        })
    }

    /// Union the source results, dedup by rule id, and resolve unscored
    /// ids against the catalog with a single lookup. A failed lookup
    /// degrades to the scored candidates alone.
    async fn merge(
        &self,
        outcomes: Vec<(String, SourceOutcome)>,
    ) -> (Vec<Candidate>, Option<DegradationEvent>) {
        let mut seen: HashSet<String> = HashSet::new();
        let mut scored: Vec<Candidate> = Vec::new();
        // Rule ids awaiting catalog resolution, tagged with the source
        // type that proposed them first.
        let mut pending: HashMap<String, SourceType> = HashMap::new();

        // Scored candidates claim their ids first, so an id found by both
        // the vector source and a matcher keeps its similarity score.
        for (_, outcome) in &outcomes {
            for candidate in &outcome.candidates {
                if seen.insert(candidate.id.clone()) {
                    scored.push(candidate.clone());
                }
            }
        }
        for (name, outcome) in &outcomes {
            let source_type = match name.as_str() {
                "pattern" => SourceType::Pattern,
                _ => SourceType::Trigger,
            };
            for id in &outcome.rule_ids {
                if !seen.contains(id) {
                    pending.entry(id.clone()).or_insert(source_type);
                }
            }
        }

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        if pending.is_empty() {
            return (scored, None);
        }

        let ids: HashSet<String> = pending.keys().cloned().collect();
        let rules = match self.catalog.rules_by_id(&ids).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "rule resolution failed, keeping scored candidates only");
                let event = DegradationEvent::new(
                    "rule_resolution",
                    e.to_string(),
                    "scored candidates only",
                );
                return (scored, Some(event));
            }
        };

        let mut resolved: Vec<Candidate> = rules
            .iter()
            .filter_map(|rule| {
                pending
                    .get(&rule.id)
                    .map(|&source_type| Candidate::from_rule(rule, source_type))
            })
            .collect();
        resolved.sort_by(|a, b| a.id.cmp(&b.id));

        scored.extend(resolved);
        (scored, None)
    }
}
