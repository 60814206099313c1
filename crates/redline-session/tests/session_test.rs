//! End-to-end session tests over the in-memory collaborators.

use std::sync::Arc;

use async_trait::async_trait;

use redline_core::config::{AuditOverrides, AuditorConfig};
use redline_core::errors::{RedlineError, RedlineResult, RetrievalError, SessionError};
use redline_core::models::{
    AuditIterationResult, IndexHit, ReportedViolation, RuleType, SearchMode, StyleRule,
};
use redline_core::traits::IVectorIndex;
use redline_session::SessionOrchestrator;
use test_fixtures::{
    hit, init_tracing, FailingIndex, FailingRanker, ScriptedModel, StaticCatalog, StaticIndex,
    StaticRanker,
};

fn rule(term: &str, definition: &str) -> StyleRule {
    StyleRule::new(
        term,
        definition,
        format!("https://example.org/{term}"),
        vec![],
        RuleType::AtomicCheck,
    )
}

fn reported(text: &str, rule_id: &str) -> ReportedViolation {
    ReportedViolation {
        text: text.to_string(),
        explanation: "violates the guideline".to_string(),
        suggested_fix: "fix".to_string(),
        rule_id: rule_id.to_string(),
        rule_name: None,
        url: None,
    }
}

fn base_config() -> AuditorConfig {
    AuditorConfig {
        use_query_fusion: false,
        use_reranker: false,
        ..Default::default()
    }
}

#[tokio::test]
async fn single_paragraph_end_to_end() {
    init_tracing();
    let oilsands = rule("oilsands", "Use 'oilsands', not 'tarsands'.");

    let mut catalog = StaticCatalog::new();
    catalog.add_rule(oilsands.clone());
    catalog.add_trigger("tarsands", &oilsands.id);

    let mut index = StaticIndex::new();
    index.default_hits(vec![hit(&oilsands, 0.9)]);

    let model = Arc::new(ScriptedModel::new());
    model.push_audit(AuditIterationResult {
        violations: vec![reported("tarsands", &oilsands.id)],
        confident: true,
        ..Default::default()
    });

    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(index),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(catalog),
    );

    let (violations, report) = orchestrator
        .audit_text("The tarsands expansion continues.", None)
        .await
        .unwrap();

    assert_eq!(violations.len(), 1);
    let violation = &violations[0];
    assert_eq!(violation.text, "tarsands");
    assert_eq!(violation.start_index, Some(4));
    assert_eq!(violation.end_index, Some(12));
    assert_eq!(
        &violation.source_paragraph[violation.start_index.unwrap()..violation.end_index.unwrap()],
        "tarsands"
    );
    assert_eq!(violation.rule_name.as_deref(), Some("oilsands"));
    assert_eq!(
        violation.url.as_deref(),
        Some("https://example.org/oilsands")
    );

    assert_eq!(report.paragraph_count, 1);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(report.paragraphs.len(), 1);
    assert!(report.paragraphs[0]
        .gather
        .sources
        .iter()
        .any(|s| s.source == "trigger"));
}

#[tokio::test]
async fn empty_input_returns_empty_without_work() {
    let model = Arc::new(ScriptedModel::new());
    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(StaticIndex::new()),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(StaticCatalog::new()),
    );

    let (violations, report) = orchestrator.audit_text("   \n \n ", None).await.unwrap();
    assert!(violations.is_empty());
    assert_eq!(report.paragraph_count, 0);
    assert_eq!(model.audit_calls(), 0);
}

#[tokio::test]
async fn zero_candidates_skips_the_agent() {
    let model = Arc::new(ScriptedModel::new());
    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(StaticIndex::new()), // empty index
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(StaticCatalog::new()), // no triggers or patterns
    );

    let (violations, report) = orchestrator
        .audit_text("Nothing matches anything here.", None)
        .await
        .unwrap();

    assert!(violations.is_empty());
    assert_eq!(report.succeeded, 1);
    assert_eq!(model.audit_calls(), 0);
}

#[tokio::test]
async fn paragraphs_fan_out_and_aggregate_in_order() {
    let oilsands = rule("oilsands", "Use 'oilsands'.");
    let emdash = rule("em dash", "No spaces around em dashes.");

    let mut catalog = StaticCatalog::new();
    catalog.add_rule(oilsands.clone());
    catalog.add_rule(emdash.clone());
    catalog.add_trigger("tarsands", &oilsands.id);
    catalog.add_trigger("dash", &emdash.id);

    let model = Arc::new(ScriptedModel::new());
    // One confident result per paragraph; order of consumption is
    // arbitrary under concurrency, so both report no violations and the
    // assertion rides on the report structure instead.
    model.push_audit(AuditIterationResult {
        confident: true,
        ..Default::default()
    });
    model.push_audit(AuditIterationResult {
        confident: true,
        ..Default::default()
    });

    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(StaticIndex::new()),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(catalog),
    );

    let (_, report) = orchestrator
        .audit_text("About the tarsands.\n\nAbout the dash rule.", None)
        .await
        .unwrap();

    assert_eq!(report.paragraph_count, 2);
    assert_eq!(report.succeeded, 2);
    // Paragraph audits come back in input order regardless of completion order.
    assert_eq!(report.paragraphs[0].index, 0);
    assert_eq!(report.paragraphs[1].index, 1);
    assert!(report.paragraphs[0].paragraph.contains("tarsands"));
    assert_eq!(model.audit_calls(), 2);
}

#[tokio::test]
async fn overrides_are_honored_per_run() {
    let oilsands = rule("oilsands", "Use 'oilsands'.");
    let mut catalog = StaticCatalog::new();
    catalog.add_rule(oilsands.clone());
    catalog.add_trigger("tarsands", &oilsands.id);

    let model = Arc::new(ScriptedModel::new());
    // Asks for more context, but the override caps iterations at 1.
    model.push_audit(AuditIterationResult {
        confident: false,
        needs_more_context: true,
        additional_queries: vec!["anything".to_string()],
        ..Default::default()
    });

    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(StaticIndex::new()),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(catalog),
    );

    let overrides = AuditOverrides {
        max_agent_iterations: Some(1),
        ..Default::default()
    };
    let (_, report) = orchestrator
        .audit_text("About the tarsands.", Some(&overrides))
        .await
        .unwrap();

    assert_eq!(model.audit_calls(), 1);
    assert_eq!(report.paragraphs[0].iterations.len(), 1);
}

#[tokio::test]
async fn invalid_overrides_fail_fast() {
    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(StaticIndex::new()),
        Arc::new(ScriptedModel::new()),
        Arc::new(StaticRanker::new()),
        Arc::new(StaticCatalog::new()),
    );
    let overrides = AuditOverrides {
        max_agent_iterations: Some(0),
        ..Default::default()
    };
    assert!(orchestrator
        .audit_text("text", Some(&overrides))
        .await
        .is_err());
}

#[tokio::test]
async fn all_paragraphs_failing_surfaces_a_session_error() {
    // Vector is the only source and the index is down: every paragraph
    // sees AllSourcesFailed.
    let config = AuditorConfig {
        use_trigger_source: false,
        use_pattern_source: false,
        use_query_fusion: false,
        use_reranker: false,
        ..Default::default()
    };
    let orchestrator = SessionOrchestrator::new(
        config,
        Arc::new(FailingIndex),
        Arc::new(ScriptedModel::new()),
        Arc::new(StaticRanker::new()),
        Arc::new(StaticCatalog::new()),
    );

    let result = orchestrator.audit_text("First.\n\nSecond.", None).await;
    assert!(matches!(
        result,
        Err(RedlineError::Session(SessionError::AllParagraphsFailed {
            total: 2
        }))
    ));
}

/// Fails only for paragraphs containing a marker, to exercise partial
/// session failure.
struct SelectiveIndex;

#[async_trait]
impl IVectorIndex for SelectiveIndex {
    async fn search(
        &self,
        query: &str,
        _top_k: usize,
        _mode: SearchMode,
    ) -> RedlineResult<Vec<IndexHit>> {
        if query.contains("poison") {
            Err(RetrievalError::SearchFailed {
                reason: "index shard down".to_string(),
            }
            .into())
        } else {
            Ok(vec![IndexHit {
                id: "rule-ok".to_string(),
                term: "ok".to_string(),
                text: "A guideline.".to_string(),
                url: String::new(),
                score: 0.9,
            }])
        }
    }
}

#[tokio::test]
async fn sibling_paragraphs_survive_one_failed_unit() {
    let config = AuditorConfig {
        use_trigger_source: false,
        use_pattern_source: false,
        use_query_fusion: false,
        use_reranker: false,
        ..Default::default()
    };
    let model = Arc::new(ScriptedModel::new());
    model.push_audit(AuditIterationResult {
        confident: true,
        ..Default::default()
    });

    let orchestrator = SessionOrchestrator::new(
        config,
        Arc::new(SelectiveIndex),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(StaticCatalog::new()),
    );

    let (violations, report) = orchestrator
        .audit_text("A fine paragraph.\n\nA poison paragraph.", None)
        .await
        .unwrap();

    assert!(violations.is_empty());
    assert_eq!(report.paragraph_count, 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains("paragraph 1"));
}

#[tokio::test]
async fn rerank_failure_degrades_and_is_reported() {
    let oilsands = rule("oilsands", "Use 'oilsands'.");
    let mut index = StaticIndex::new();
    index.default_hits(vec![hit(&oilsands, 0.9)]);

    let model = Arc::new(ScriptedModel::new());
    model.push_audit(AuditIterationResult {
        confident: true,
        ..Default::default()
    });

    let config = AuditorConfig {
        use_query_fusion: false,
        use_reranker: true,
        use_trigger_source: false,
        use_pattern_source: false,
        ..Default::default()
    };
    let orchestrator = SessionOrchestrator::new(
        config,
        Arc::new(index),
        Arc::clone(&model) as _,
        Arc::new(FailingRanker),
        Arc::new(StaticCatalog::new()),
    );

    let (_, report) = orchestrator.audit_text("About the oilsands.", None).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(report.paragraphs[0]
        .degradations
        .iter()
        .any(|d| d.component == "reranker"));
    // The agent still ran over the unranked candidates.
    assert_eq!(model.audit_calls(), 1);
}

#[tokio::test]
async fn failed_trigger_listing_disables_source_but_session_runs() {
    struct NoTriggerCatalog(StaticCatalog);

    #[async_trait]
    impl redline_core::traits::IRuleCatalog for NoTriggerCatalog {
        async fn rules_by_id(
            &self,
            ids: &std::collections::HashSet<String>,
        ) -> RedlineResult<Vec<StyleRule>> {
            self.0.rules_by_id(ids).await
        }

        async fn list_triggers(&self) -> RedlineResult<Vec<redline_core::models::RuleTrigger>> {
            Err(redline_core::errors::CatalogError::TriggerListingFailed {
                reason: "listing timed out".to_string(),
            }
            .into())
        }

        async fn list_patterns(&self) -> RedlineResult<Vec<redline_core::models::RulePattern>> {
            self.0.list_patterns().await
        }
    }

    let oilsands = rule("oilsands", "Use 'oilsands'.");
    let mut index = StaticIndex::new();
    index.default_hits(vec![hit(&oilsands, 0.9)]);

    let model = Arc::new(ScriptedModel::new());
    model.push_audit(AuditIterationResult {
        confident: true,
        ..Default::default()
    });

    let orchestrator = SessionOrchestrator::new(
        base_config(),
        Arc::new(index),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(NoTriggerCatalog(StaticCatalog::new())),
    );

    let (_, report) = orchestrator.audit_text("About the oilsands.", None).await.unwrap();

    assert_eq!(report.succeeded, 1);
    assert!(report
        .degradations
        .iter()
        .any(|d| d.component == "source:trigger"));
}

#[tokio::test]
async fn bounded_concurrency_still_completes() {
    let oilsands = rule("oilsands", "Use 'oilsands'.");
    let mut index = StaticIndex::new();
    index.default_hits(vec![hit(&oilsands, 0.9)]);

    let model = Arc::new(ScriptedModel::new());
    for _ in 0..4 {
        model.push_audit(AuditIterationResult {
            confident: true,
            ..Default::default()
        });
    }

    let config = AuditorConfig {
        max_concurrent_requests: 1,
        use_query_fusion: false,
        use_reranker: false,
        use_trigger_source: false,
        use_pattern_source: false,
        ..Default::default()
    };
    let orchestrator = SessionOrchestrator::new(
        config,
        Arc::new(index),
        Arc::clone(&model) as _,
        Arc::new(StaticRanker::new()),
        Arc::new(StaticCatalog::new()),
    );

    let (_, report) = orchestrator
        .audit_text("One.\n\nTwo.\n\nThree.\n\nFour.", None)
        .await
        .unwrap();

    assert_eq!(report.succeeded, 4);
    assert_eq!(model.audit_calls(), 4);
}
