use async_trait::async_trait;

use crate::errors::RedlineResult;
use crate::models::{AuditIterationResult, FusionPlan};

/// Generative-model collaborator.
///
/// The structured variants force a schema on the model side; callers
/// receive typed results, never raw JSON.
#[async_trait]
pub trait IGenerativeModel: Send + Sync {
    /// Plain completion, used for light auxiliary generation.
    async fn complete(&self, prompt: &str) -> RedlineResult<String>;

    /// Structured audit completion: the typed per-iteration result.
    async fn complete_audit(&self, prompt: &str) -> RedlineResult<AuditIterationResult>;

    /// Structured fusion planning: terms plus per-term search queries,
    /// produced in a single call.
    async fn complete_fusion_plan(&self, prompt: &str) -> RedlineResult<FusionPlan>;
}
