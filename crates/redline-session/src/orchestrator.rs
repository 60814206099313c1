//! SessionOrchestrator: builds the per-run pipeline and fans out work.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use redline_core::config::{AuditOverrides, AuditorConfig};
use redline_core::errors::{RedlineResult, SessionError};
use redline_core::models::{DegradationEvent, ParagraphAudit, SessionReport, Violation};
use redline_core::traits::{IGenerativeModel, IRuleCatalog, ISemanticRanker, IVectorIndex};

use redline_agent::{resolver, AuditAgent};
use redline_retrieval::ranking::RerankStage;
use redline_retrieval::sources::patterns::{PatternSet, PatternSource};
use redline_retrieval::sources::triggers::{TriggerMatcher, TriggerSource};
use redline_retrieval::sources::vector::VectorSource;
use redline_retrieval::sources::RuleSource;
use redline_retrieval::{RuleGatherer, VectorRetriever};

use crate::paragraphs::split_paragraphs;

/// Top-level entry point for an audit session.
///
/// Holds the session defaults and the collaborator handles; each call to
/// [`audit_text`](Self::audit_text) freezes a per-run config snapshot and
/// builds its own pipeline, so concurrent runs never share mutable state.
pub struct SessionOrchestrator {
    config: AuditorConfig,
    index: Arc<dyn IVectorIndex>,
    model: Arc<dyn IGenerativeModel>,
    ranker: Arc<dyn ISemanticRanker>,
    catalog: Arc<dyn IRuleCatalog>,
}

impl SessionOrchestrator {
    pub fn new(
        config: AuditorConfig,
        index: Arc<dyn IVectorIndex>,
        model: Arc<dyn IGenerativeModel>,
        ranker: Arc<dyn ISemanticRanker>,
        catalog: Arc<dyn IRuleCatalog>,
    ) -> Self {
        Self {
            config,
            index,
            model,
            ranker,
            catalog,
        }
    }

    /// Audit `text`, returning the deduplicated violations and the
    /// session report. Partial results are always preferred over total
    /// failure: only a session where every paragraph failed errors out.
    pub async fn audit_text(
        &self,
        text: &str,
        overrides: Option<&AuditOverrides>,
    ) -> RedlineResult<(Vec<Violation>, SessionReport)> {
        let session_start = Instant::now();
        let started_at = Utc::now();
        let session_id = uuid::Uuid::new_v4().to_string();

        // 1. Resolve and freeze the per-run config.
        let run_config = match overrides {
            Some(overrides) => self.config.with_overrides(overrides),
            None => self.config.clone(),
        };
        run_config.validate()?;
        let config = Arc::new(run_config);

        let paragraphs = split_paragraphs(text);
        if paragraphs.is_empty() {
            return Ok((
                Vec::new(),
                SessionReport {
                    session_id,
                    model_name: config.model_name.clone(),
                    started_at,
                    paragraph_count: 0,
                    succeeded: 0,
                    failed: 0,
                    paragraphs: Vec::new(),
                    errors: Vec::new(),
                    degradations: Vec::new(),
                    total_elapsed_ms: session_start.elapsed().as_millis() as u64,
                },
            ));
        }

        // 2. Build the per-run pipeline. The semaphore gates every
        //    in-flight collaborator call; the trigger automaton and
        //    pattern set are built once and shared read-only.
        let gate = Arc::new(Semaphore::new(config.max_concurrent_requests));
        let retriever = Arc::new(VectorRetriever::new(
            Arc::clone(&self.index),
            Arc::clone(&config),
            Arc::clone(&gate),
        ));

        let mut build_degradations = Vec::new();
        let sources = self
            .build_sources(&config, &retriever, &gate, &mut build_degradations)
            .await;

        let gatherer = Arc::new(RuleGatherer::new(sources, Arc::clone(&self.catalog)));
        let rerank = Arc::new(RerankStage::new(
            Arc::clone(&self.ranker),
            Arc::clone(&config),
            Arc::clone(&gate),
        ));
        let agent = Arc::new(AuditAgent::new(
            Arc::clone(&self.model),
            Arc::clone(&retriever),
            Arc::clone(&config),
            Arc::clone(&gate),
        ));

        info!(
            session = %session_id,
            paragraphs = paragraphs.len(),
            "auditing text"
        );

        // 3. Fan out, one task per paragraph, errors isolated per task.
        let mut tasks: JoinSet<Result<(usize, ParagraphAudit, Vec<Violation>), (usize, String)>> =
            JoinSet::new();
        for (index, paragraph) in paragraphs.iter().cloned().enumerate() {
            let gatherer = Arc::clone(&gatherer);
            let rerank = Arc::clone(&rerank);
            let agent = Arc::clone(&agent);
            tasks.spawn(async move {
                audit_paragraph(index, paragraph, gatherer, rerank, agent).await
            });
        }

        let mut audits: Vec<(usize, ParagraphAudit, Vec<Violation>)> = Vec::new();
        let mut errors: Vec<String> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Ok(success)) => audits.push(success),
                Ok(Err((index, reason))) => {
                    error!(paragraph = index, %reason, "paragraph audit failed");
                    errors.push(format!("paragraph {index}: {reason}"));
                }
                Err(e) => {
                    error!(error = %e, "paragraph task aborted");
                    errors.push(format!("task aborted: {e}"));
                }
            }
        }

        if audits.is_empty() {
            error!(session = %session_id, "all paragraphs failed");
            return Err(SessionError::AllParagraphsFailed {
                total: paragraphs.len(),
            }
            .into());
        }

        // 4. Aggregate in paragraph order — join order is arbitrary and
        //    must not leak into the output.
        audits.sort_by_key(|(index, _, _)| *index);
        let mut all_violations = Vec::new();
        let mut paragraph_audits = Vec::new();
        for (_, audit, violations) in audits {
            all_violations.extend(violations);
            paragraph_audits.push(audit);
        }
        let final_violations = resolver::deduplicate(all_violations);

        let total_elapsed_ms = session_start.elapsed().as_millis() as u64;
        info!(
            session = %session_id,
            violations = final_violations.len(),
            elapsed_ms = total_elapsed_ms,
            "audit session complete"
        );

        let report = SessionReport {
            session_id,
            model_name: config.model_name.clone(),
            started_at,
            paragraph_count: paragraphs.len(),
            succeeded: paragraph_audits.len(),
            failed: paragraphs.len() - paragraph_audits.len(),
            paragraphs: paragraph_audits,
            errors,
            degradations: build_degradations,
            total_elapsed_ms,
        };

        Ok((final_violations, report))
    }

    /// Build the enabled sources. A matcher whose catalog listing fails
    /// is disabled for the run (recorded as a degradation) rather than
    /// failing the session — the remaining sources still gather.
    async fn build_sources(
        &self,
        config: &Arc<AuditorConfig>,
        retriever: &Arc<VectorRetriever>,
        gate: &Arc<Semaphore>,
        degradations: &mut Vec<DegradationEvent>,
    ) -> Vec<Arc<dyn RuleSource>> {
        let mut sources: Vec<Arc<dyn RuleSource>> = Vec::new();

        if config.use_vector_source {
            sources.push(Arc::new(VectorSource::new(
                Arc::clone(retriever),
                Arc::clone(&self.model),
                Arc::clone(config),
                Arc::clone(gate),
            )));
        }

        if config.use_trigger_source {
            match self.catalog.list_triggers().await {
                Ok(triggers) => match TriggerMatcher::build(&triggers) {
                    Ok(matcher) => {
                        debug!(triggers = matcher.len(), "trigger source enabled");
                        sources.push(Arc::new(TriggerSource::new(Arc::new(matcher))));
                    }
                    Err(e) => {
                        warn!(error = %e, "trigger automaton build failed, source disabled");
                        degradations.push(DegradationEvent::new(
                            "source:trigger",
                            e.to_string(),
                            "source disabled for this run",
                        ));
                    }
                },
                Err(e) => {
                    warn!(error = %e, "trigger listing failed, source disabled");
                    degradations.push(DegradationEvent::new(
                        "source:trigger",
                        e.to_string(),
                        "source disabled for this run",
                    ));
                }
            }
        }

        if config.use_pattern_source {
            match self.catalog.list_patterns().await {
                Ok(patterns) => {
                    let set = PatternSet::build(&patterns);
                    debug!(patterns = set.len(), "pattern source enabled");
                    sources.push(Arc::new(PatternSource::new(Arc::new(set))));
                }
                Err(e) => {
                    warn!(error = %e, "pattern listing failed, source disabled");
                    degradations.push(DegradationEvent::new(
                        "source:pattern",
                        e.to_string(),
                        "source disabled for this run",
                    ));
                }
            }
        }

        sources
    }
}

/// One paragraph through the full pipeline: gather → rerank → audit loop.
async fn audit_paragraph(
    index: usize,
    paragraph: String,
    gatherer: Arc<RuleGatherer>,
    rerank: Arc<RerankStage>,
    agent: Arc<AuditAgent>,
) -> Result<(usize, ParagraphAudit, Vec<Violation>), (usize, String)> {
    let started = Instant::now();

    let gathered = gatherer
        .gather(&paragraph)
        .await
        .map_err(|e| (index, e.to_string()))?;

    let mut degradations = gathered.degradations;
    let (candidates, rerank_degradation) = rerank.rerank(gathered.candidates, &paragraph).await;
    if let Some(event) = rerank_degradation {
        degradations.push(event);
    }

    let outcome = agent.audit(&paragraph, candidates).await;

    let audit = ParagraphAudit {
        index,
        violation_count: outcome.violations.len(),
        gather: gathered.report,
        iterations: outcome.iterations,
        degradations,
        elapsed_ms: started.elapsed().as_millis() as u64,
        paragraph,
    };

    Ok((index, audit, outcome.violations))
}
