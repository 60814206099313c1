use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recorded whenever a stage falls back instead of failing
/// (rerank fallback, fusion fallback, a gathering source down).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DegradationEvent {
    pub component: String,
    pub failure: String,
    pub fallback_used: String,
    pub timestamp: DateTime<Utc>,
}

impl DegradationEvent {
    pub fn new(
        component: impl Into<String>,
        failure: impl Into<String>,
        fallback_used: impl Into<String>,
    ) -> Self {
        Self {
            component: component.into(),
            failure: failure.into(),
            fallback_used: fallback_used.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Per-source observability metadata from a gathering pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: String,
    pub candidate_count: usize,
    pub elapsed_ms: u64,
    /// True when the source errored and degraded to an empty result.
    pub degraded: bool,
}

/// Gathering-pass summary: deduplicated candidate count + source reports.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatherReport {
    pub deduplicated_count: usize,
    pub sources: Vec<SourceReport>,
}

/// Trace of one agent iteration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationTrace {
    pub iteration: usize,
    pub violation_count: usize,
    pub confident: bool,
    pub needs_more_context: bool,
    pub additional_queries: Vec<String>,
    /// Set when the generative call failed and the loop stopped.
    pub error: Option<String>,
}

/// Full trace for one audited paragraph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParagraphAudit {
    pub index: usize,
    pub paragraph: String,
    pub violation_count: usize,
    pub gather: GatherReport,
    pub iterations: Vec<IterationTrace>,
    pub degradations: Vec<DegradationEvent>,
    pub elapsed_ms: u64,
}

/// Session-level summary returned alongside the final violation list,
/// consumed by the (external) audit-log layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub session_id: String,
    pub model_name: String,
    pub started_at: DateTime<Utc>,
    pub paragraph_count: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub paragraphs: Vec<ParagraphAudit>,
    /// Paragraph-level failures (the audit continued without them).
    pub errors: Vec<String>,
    /// Session-build fallbacks, e.g. a matcher source disabled because
    /// its catalog listing failed.
    pub degradations: Vec<DegradationEvent>,
    pub total_elapsed_ms: u64,
}
