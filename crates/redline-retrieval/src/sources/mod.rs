//! Gathering sources behind one capability trait.
//!
//! The set of sources is closed: vector similarity, exact triggers, and
//! regex patterns. Which of them run is decided by configuration at
//! session-build time; the gatherer treats them uniformly.

pub mod patterns;
pub mod triggers;
pub mod vector;

use std::collections::HashSet;

use async_trait::async_trait;

use redline_core::errors::RedlineResult;
use redline_core::models::{Candidate, DegradationEvent};

/// What one source produced for a piece of text.
///
/// The vector source yields scored candidates directly; trigger and
/// pattern sources yield bare rule ids that the gatherer resolves
/// against the catalog in a single lookup.
#[derive(Debug, Default)]
pub struct SourceOutcome {
    pub candidates: Vec<Candidate>,
    pub rule_ids: HashSet<String>,
    /// Set when the source fell back internally (e.g. fusion plan failure).
    pub degradation: Option<DegradationEvent>,
}

/// A gathering source proposes rules relevant to a piece of text.
#[async_trait]
pub trait RuleSource: Send + Sync {
    /// Source name used in reports ("vector", "trigger", "pattern").
    fn name(&self) -> &'static str;

    async fn gather(&self, text: &str) -> RedlineResult<SourceOutcome>;
}
