//! In-memory fakes for the four collaborator contracts, shared by the
//! integration tests across the workspace.
//!
//! The fakes are deterministic: the index answers from a fixed response
//! table, the model replays a scripted queue, the ranker applies a fixed
//! score map. Every fake also has a failing variant for degradation
//! tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use redline_core::errors::{
    CatalogError, GenerationError, RedlineResult, RerankError, RetrievalError,
};
use redline_core::models::{
    AuditIterationResult, FusionPlan, IndexHit, RulePattern, RuleTrigger, SearchMode, StyleRule,
};
use redline_core::traits::{
    IGenerativeModel, IRuleCatalog, ISemanticRanker, RankRecord, RankedRecord,
};

/// Initialize tracing for tests. Safe to call repeatedly.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ---------------------------------------------------------------------------
// Rule catalog
// ---------------------------------------------------------------------------

/// An in-memory rule catalog with call counting.
#[derive(Default)]
pub struct StaticCatalog {
    rules: HashMap<String, StyleRule>,
    triggers: Vec<RuleTrigger>,
    patterns: Vec<RulePattern>,
    lookup_calls: AtomicUsize,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, returning its content-addressed id.
    pub fn add_rule(&mut self, rule: StyleRule) -> String {
        let id = rule.id.clone();
        self.rules.insert(id.clone(), rule);
        id
    }

    pub fn add_trigger(&mut self, trigger_text: &str, rule_id: &str) {
        self.triggers.push(RuleTrigger {
            trigger_text: trigger_text.to_string(),
            rule_id: rule_id.to_string(),
        });
    }

    pub fn add_pattern(&mut self, pattern_regex: &str, rule_id: &str) {
        self.patterns.push(RulePattern {
            pattern_regex: pattern_regex.to_string(),
            rule_id: rule_id.to_string(),
        });
    }

    /// Number of `rules_by_id` calls observed.
    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IRuleCatalog for StaticCatalog {
    async fn rules_by_id(&self, ids: &HashSet<String>) -> RedlineResult<Vec<StyleRule>> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .filter_map(|id| self.rules.get(id).cloned())
            .collect())
    }

    async fn list_triggers(&self) -> RedlineResult<Vec<RuleTrigger>> {
        Ok(self.triggers.clone())
    }

    async fn list_patterns(&self) -> RedlineResult<Vec<RulePattern>> {
        Ok(self.patterns.clone())
    }
}

/// A catalog whose every call fails.
pub struct FailingCatalog;

#[async_trait]
impl IRuleCatalog for FailingCatalog {
    async fn rules_by_id(&self, _ids: &HashSet<String>) -> RedlineResult<Vec<StyleRule>> {
        Err(CatalogError::LookupFailed {
            reason: "catalog offline".to_string(),
        }
        .into())
    }

    async fn list_triggers(&self) -> RedlineResult<Vec<RuleTrigger>> {
        Err(CatalogError::TriggerListingFailed {
            reason: "catalog offline".to_string(),
        }
        .into())
    }

    async fn list_patterns(&self) -> RedlineResult<Vec<RulePattern>> {
        Err(CatalogError::PatternListingFailed {
            reason: "catalog offline".to_string(),
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Vector index
// ---------------------------------------------------------------------------

/// An index answering from a substring-keyed response table.
///
/// A query returns the hits of the first key it contains, falling back
/// to `default_hits`. Queries are recorded for assertions.
#[derive(Default)]
pub struct StaticIndex {
    responses: Vec<(String, Vec<IndexHit>)>,
    default_hits: Vec<IndexHit>,
    queries: Mutex<Vec<String>>,
}

impl StaticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_to(&mut self, key: &str, hits: Vec<IndexHit>) {
        self.responses.push((key.to_string(), hits));
    }

    pub fn default_hits(&mut self, hits: Vec<IndexHit>) {
        self.default_hits = hits;
    }

    pub fn seen_queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

/// Build an [`IndexHit`] for a rule with a given score.
pub fn hit(rule: &StyleRule, score: f64) -> IndexHit {
    IndexHit {
        id: rule.id.clone(),
        term: rule.term.clone(),
        text: rule.definition.clone(),
        url: rule.url.clone(),
        score,
    }
}

#[async_trait]
impl redline_core::traits::IVectorIndex for StaticIndex {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        _mode: SearchMode,
    ) -> RedlineResult<Vec<IndexHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        let mut hits = self
            .responses
            .iter()
            .find(|(key, _)| query.contains(key.as_str()))
            .map(|(_, hits)| hits.clone())
            .unwrap_or_else(|| self.default_hits.clone());
        hits.truncate(top_k);
        Ok(hits)
    }
}

/// An index whose every query fails.
pub struct FailingIndex;

#[async_trait]
impl redline_core::traits::IVectorIndex for FailingIndex {
    async fn search(
        &self,
        _query: &str,
        _top_k: usize,
        _mode: SearchMode,
    ) -> RedlineResult<Vec<IndexHit>> {
        Err(RetrievalError::SearchFailed {
            reason: "index unreachable".to_string(),
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Generative model
// ---------------------------------------------------------------------------

/// Replays scripted audit results in order; panics-free — an exhausted
/// queue returns a confident empty result so tests fail on assertions,
/// not on missing script entries.
#[derive(Default)]
pub struct ScriptedModel {
    audits: Mutex<VecDeque<AuditIterationResult>>,
    fusion_plans: Mutex<VecDeque<FusionPlan>>,
    audit_calls: AtomicUsize,
    fusion_calls: AtomicUsize,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_audit(&self, result: AuditIterationResult) {
        self.audits.lock().unwrap().push_back(result);
    }

    pub fn push_fusion_plan(&self, plan: FusionPlan) {
        self.fusion_plans.lock().unwrap().push_back(plan);
    }

    pub fn audit_calls(&self) -> usize {
        self.audit_calls.load(Ordering::SeqCst)
    }

    pub fn fusion_calls(&self) -> usize {
        self.fusion_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IGenerativeModel for ScriptedModel {
    async fn complete(&self, _prompt: &str) -> RedlineResult<String> {
        Ok(String::new())
    }

    async fn complete_audit(&self, _prompt: &str) -> RedlineResult<AuditIterationResult> {
        self.audit_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .audits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(AuditIterationResult {
                confident: true,
                ..Default::default()
            }))
    }

    async fn complete_fusion_plan(&self, _prompt: &str) -> RedlineResult<FusionPlan> {
        self.fusion_calls.fetch_add(1, Ordering::SeqCst);
        match self.fusion_plans.lock().unwrap().pop_front() {
            Some(plan) => Ok(plan),
            None => Err(GenerationError::CompletionFailed {
                reason: "no scripted fusion plan".to_string(),
            }
            .into()),
        }
    }
}

/// A model whose every call fails.
pub struct FailingModel;

#[async_trait]
impl IGenerativeModel for FailingModel {
    async fn complete(&self, _prompt: &str) -> RedlineResult<String> {
        Err(GenerationError::CompletionFailed {
            reason: "model unavailable".to_string(),
        }
        .into())
    }

    async fn complete_audit(&self, _prompt: &str) -> RedlineResult<AuditIterationResult> {
        Err(GenerationError::CompletionFailed {
            reason: "model unavailable".to_string(),
        }
        .into())
    }

    async fn complete_fusion_plan(&self, _prompt: &str) -> RedlineResult<FusionPlan> {
        Err(GenerationError::CompletionFailed {
            reason: "model unavailable".to_string(),
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// Semantic ranker
// ---------------------------------------------------------------------------

/// Ranks by a fixed id → score map; unknown ids score 0.0.
#[derive(Default)]
pub struct StaticRanker {
    scores: HashMap<String, f64>,
}

impl StaticRanker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&mut self, id: &str, score: f64) {
        self.scores.insert(id.to_string(), score);
    }
}

#[async_trait]
impl ISemanticRanker for StaticRanker {
    async fn rank(
        &self,
        _query: &str,
        records: Vec<RankRecord>,
        top_n: usize,
    ) -> RedlineResult<Vec<RankedRecord>> {
        let mut ranked: Vec<RankedRecord> = records
            .iter()
            .map(|r| RankedRecord {
                id: r.id.clone(),
                score: self.scores.get(&r.id).copied().unwrap_or(0.0),
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_n);
        Ok(ranked)
    }
}

/// A ranker whose every call fails.
pub struct FailingRanker;

#[async_trait]
impl ISemanticRanker for FailingRanker {
    async fn rank(
        &self,
        _query: &str,
        _records: Vec<RankRecord>,
        _top_n: usize,
    ) -> RedlineResult<Vec<RankedRecord>> {
        Err(RerankError::ServiceFailed {
            reason: "ranker quota exhausted".to_string(),
        }
        .into())
    }
}
