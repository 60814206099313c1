use std::collections::HashSet;

use async_trait::async_trait;

use crate::errors::RedlineResult;
use crate::models::{RulePattern, RuleTrigger, StyleRule};

/// Read-only access to the external rule catalog.
///
/// The catalog never changes during a request; the trigger/pattern
/// listings are fetched once at session-build time.
#[async_trait]
pub trait IRuleCatalog: Send + Sync {
    /// Resolve a set of rule ids to full records in one call.
    /// Unknown ids are silently absent from the result.
    async fn rules_by_id(&self, ids: &HashSet<String>) -> RedlineResult<Vec<StyleRule>>;

    /// All (trigger_text, rule_id) pairs, for the trigger automaton.
    async fn list_triggers(&self) -> RedlineResult<Vec<RuleTrigger>>;

    /// All (pattern_regex, rule_id) pairs, for the pattern matcher.
    async fn list_patterns(&self) -> RedlineResult<Vec<RulePattern>>;
}
