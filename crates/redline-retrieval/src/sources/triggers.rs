//! Exact multi-pattern trigger matching.
//!
//! One Aho-Corasick automaton over every known trigger phrase, built
//! once at session-build time and shared read-only across concurrent
//! requests. Scanning is O(|text| + matches) regardless of trigger-set
//! size or overlaps.

use std::collections::HashSet;
use std::sync::Arc;

use aho_corasick::AhoCorasick;
use async_trait::async_trait;
use tracing::debug;

use redline_core::errors::{RedlineResult, RetrievalError};
use redline_core::models::RuleTrigger;

use super::{RuleSource, SourceOutcome};

/// Multi-pattern substring matcher over trigger phrases.
///
/// Substring semantics are intentional: style rules often fire on
/// fragments, so there is no word-boundary requirement. Matching is
/// case-insensitive via lower-casing both the patterns and the text.
pub struct TriggerMatcher {
    automaton: Option<AhoCorasick>,
    /// Pattern index → rule id.
    rule_ids: Vec<String>,
}

impl TriggerMatcher {
    /// Build the automaton from (trigger_text, rule_id) pairs.
    /// Empty trigger texts are skipped.
    pub fn build(triggers: &[RuleTrigger]) -> RedlineResult<Self> {
        let mut patterns = Vec::new();
        let mut rule_ids = Vec::new();
        for trigger in triggers {
            if trigger.trigger_text.is_empty() {
                continue;
            }
            patterns.push(trigger.trigger_text.to_lowercase());
            rule_ids.push(trigger.rule_id.clone());
        }

        let automaton = if patterns.is_empty() {
            None
        } else {
            Some(AhoCorasick::new(&patterns).map_err(|e| {
                RetrievalError::MatcherBuildFailed {
                    reason: e.to_string(),
                }
            })?)
        };

        debug!(triggers = rule_ids.len(), "trigger automaton built");
        Ok(Self { automaton, rule_ids })
    }

    /// Every rule whose trigger occurs as a substring of `text`.
    ///
    /// Overlapping matches are all reported, so the result is exactly
    /// the set of rules with at least one occurring trigger.
    pub fn find_matches(&self, text: &str) -> HashSet<String> {
        let Some(automaton) = &self.automaton else {
            return HashSet::new();
        };

        let haystack = text.to_lowercase();
        let mut found = HashSet::new();
        for mat in automaton.find_overlapping_iter(&haystack) {
            found.insert(self.rule_ids[mat.pattern().as_usize()].clone());
        }
        found
    }

    /// Number of trigger patterns in the automaton.
    pub fn len(&self) -> usize {
        self.rule_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_ids.is_empty()
    }
}

/// The trigger source: wraps the shared automaton.
pub struct TriggerSource {
    matcher: Arc<TriggerMatcher>,
}

impl TriggerSource {
    pub fn new(matcher: Arc<TriggerMatcher>) -> Self {
        Self { matcher }
    }
}

#[async_trait]
impl RuleSource for TriggerSource {
    fn name(&self) -> &'static str {
        "trigger"
    }

    async fn gather(&self, text: &str) -> RedlineResult<SourceOutcome> {
        let rule_ids = self.matcher.find_matches(text);
        Ok(SourceOutcome {
            rule_ids,
            ..Default::default()
        })
    }
}
