//! Reciprocal Rank Fusion: score = Σ 1/(k + rank)
//!
//! Combines multiple ranked candidate lists into a single fused ranking
//! without requiring score normalization across different queries. Used
//! only for homogeneous query result sets — the three source types are
//! unioned by id, not fused, since triggers and patterns carry no
//! comparable relevance score.

use std::collections::HashMap;

use redline_core::models::Candidate;

/// Fuse ranked lists. Each input list must be ordered best-first; `rank`
/// is the 0-based position within its list. `k` is the damping constant
/// (60 by default) — higher k flattens the influence of top positions
/// from any single list.
///
/// A candidate appearing in several lists accumulates a contribution
/// from each. Output is every distinct candidate ordered by fused score
/// descending, ties broken by id so the result does not depend on
/// arrival order.
pub fn fuse(lists: &[Vec<Candidate>], k: u32) -> Vec<Candidate> {
    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut representatives: HashMap<String, Candidate> = HashMap::new();

    for list in lists {
        for (rank, candidate) in list.iter().enumerate() {
            let rrf = 1.0 / (k as f64 + rank as f64);
            *scores.entry(candidate.id.clone()).or_default() += rrf;
            representatives
                .entry(candidate.id.clone())
                .or_insert_with(|| candidate.clone());
        }
    }

    let mut fused: Vec<Candidate> = representatives
        .into_values()
        .map(|mut candidate| {
            candidate.score = scores[&candidate.id];
            candidate
        })
        .collect();

    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    fused
}
