//! Regex rule evaluation over the full text.
//!
//! Pattern count is small relative to trigger count, so a linear scan
//! over compiled regexes is acceptable. A malformed pattern is skipped
//! at build time with a warning; it never aborts a pass.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use redline_core::errors::RedlineResult;
use redline_core::models::RulePattern;

use super::{RuleSource, SourceOutcome};

struct CompiledPattern {
    regex: Regex,
    rule_id: String,
}

/// Compiled case-insensitive rule patterns.
pub struct PatternSet {
    patterns: Vec<CompiledPattern>,
}

impl PatternSet {
    /// Compile patterns, skipping malformed ones.
    pub fn build(patterns: &[RulePattern]) -> Self {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            match RegexBuilder::new(&pattern.pattern_regex)
                .case_insensitive(true)
                .build()
            {
                Ok(regex) => compiled.push(CompiledPattern {
                    regex,
                    rule_id: pattern.rule_id.clone(),
                }),
                Err(e) => {
                    warn!(
                        pattern = %pattern.pattern_regex,
                        rule_id = %pattern.rule_id,
                        error = %e,
                        "skipping malformed rule pattern"
                    );
                }
            }
        }
        debug!(patterns = compiled.len(), "pattern set compiled");
        Self { patterns: compiled }
    }

    /// Every rule whose pattern matches somewhere in `text`.
    pub fn find_matches(&self, text: &str) -> HashSet<String> {
        self.patterns
            .iter()
            .filter(|p| p.regex.is_match(text))
            .map(|p| p.rule_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// The pattern source: wraps the shared compiled set.
pub struct PatternSource {
    patterns: Arc<PatternSet>,
}

impl PatternSource {
    pub fn new(patterns: Arc<PatternSet>) -> Self {
        Self { patterns }
    }
}

#[async_trait]
impl RuleSource for PatternSource {
    fn name(&self) -> &'static str {
        "pattern"
    }

    async fn gather(&self, text: &str) -> RedlineResult<SourceOutcome> {
        let rule_ids = self.patterns.find_matches(text);
        Ok(SourceOutcome {
            rule_ids,
            ..Default::default()
        })
    }
}
