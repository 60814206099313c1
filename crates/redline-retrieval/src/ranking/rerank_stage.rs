//! Second-pass relevance scoring via the external ranking service.
//!
//! Strictly best-effort: a service failure degrades to unranked
//! truncation and is reported as a value, never as an error. The score
//! threshold applies on both paths.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use redline_core::config::AuditorConfig;
use redline_core::models::{Candidate, DegradationEvent, SourceType};
use redline_core::traits::{ISemanticRanker, RankRecord};

/// The rerank stage of the pipeline.
pub struct RerankStage {
    ranker: Arc<dyn ISemanticRanker>,
    config: Arc<AuditorConfig>,
    gate: Arc<Semaphore>,
}

impl RerankStage {
    pub fn new(
        ranker: Arc<dyn ISemanticRanker>,
        config: Arc<AuditorConfig>,
        gate: Arc<Semaphore>,
    ) -> Self {
        Self {
            ranker,
            config,
            gate,
        }
    }

    /// Rerank `candidates` against `query`.
    ///
    /// Success replaces candidate scores with the service's and keeps the
    /// service's order; failure keeps the first `final_top_k` of the
    /// input unmodified and reports the degradation. Afterwards, on
    /// either path, candidates below `rerank_score_threshold` are
    /// dropped.
    pub async fn rerank(
        &self,
        candidates: Vec<Candidate>,
        query: &str,
    ) -> (Vec<Candidate>, Option<DegradationEvent>) {
        if candidates.is_empty() {
            return (candidates, None);
        }

        let top_k = self.config.final_top_k;

        if !self.config.use_reranker {
            let mut kept = candidates;
            kept.truncate(top_k);
            return (self.apply_threshold(kept), None);
        }

        let records: Vec<RankRecord> = candidates
            .iter()
            .map(|c| RankRecord {
                id: c.id.clone(),
                content: c.text.clone(),
            })
            .collect();

        let ranked = {
            let permit = self.gate.acquire().await;
            match permit {
                Ok(_permit) => self.ranker.rank(query, records, top_k).await,
                Err(e) => Err(redline_core::errors::RetrievalError::SearchFailed {
                    reason: format!("request gate closed: {e}"),
                }
                .into()),
            }
        };

        match ranked {
            Ok(ranked) => {
                let by_id: HashMap<&str, &Candidate> =
                    candidates.iter().map(|c| (c.id.as_str(), c)).collect();
                let mut rescored = Vec::with_capacity(ranked.len());
                for record in &ranked {
                    if let Some(&candidate) = by_id.get(record.id.as_str()) {
                        let mut candidate = candidate.clone();
                        candidate.score = record.score;
                        candidate.source_type = SourceType::Reranked;
                        rescored.push(candidate);
                    }
                }
                rescored.truncate(top_k);
                debug!(kept = rescored.len(), "rerank complete");
                (self.apply_threshold(rescored), None)
            }
            Err(e) => {
                warn!(error = %e, "rerank failed, keeping retrieval order");
                let event = DegradationEvent::new(
                    "reranker",
                    e.to_string(),
                    format!("first {top_k} candidates unranked"),
                );
                let mut kept = candidates;
                kept.truncate(top_k);
                (self.apply_threshold(kept), Some(event))
            }
        }
    }

    /// Drop candidates below the score threshold. Trigger and pattern
    /// candidates are exempt: their score is not a similarity estimate,
    /// and an exact match is already a deterministic signal. Once the
    /// ranker has re-scored them they are filtered like everything else.
    fn apply_threshold(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let threshold = self.config.rerank_score_threshold;
        candidates
            .into_iter()
            .filter(|c| {
                matches!(c.source_type, SourceType::Trigger | SourceType::Pattern)
                    || c.score >= threshold
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use redline_core::errors::{RedlineResult, RerankError};
    use redline_core::traits::RankedRecord;

    use super::*;

    struct FixedRanker {
        records: Vec<RankedRecord>,
    }

    #[async_trait::async_trait]
    impl ISemanticRanker for FixedRanker {
        async fn rank(
            &self,
            _query: &str,
            _records: Vec<RankRecord>,
            top_n: usize,
        ) -> RedlineResult<Vec<RankedRecord>> {
            let mut out = self.records.clone();
            out.truncate(top_n);
            Ok(out)
        }
    }

    struct DownRanker;

    #[async_trait::async_trait]
    impl ISemanticRanker for DownRanker {
        async fn rank(
            &self,
            _query: &str,
            _records: Vec<RankRecord>,
            _top_n: usize,
        ) -> RedlineResult<Vec<RankedRecord>> {
            Err(RerankError::ServiceFailed {
                reason: "quota exhausted".to_string(),
            }
            .into())
        }
    }

    fn candidate(id: &str, score: f64, source_type: SourceType) -> Candidate {
        Candidate {
            id: id.to_string(),
            term: id.to_string(),
            text: format!("guideline {id}"),
            url: String::new(),
            score,
            source_type,
        }
    }

    fn stage(ranker: Arc<dyn ISemanticRanker>) -> RerankStage {
        let config = Arc::new(AuditorConfig {
            final_top_k: 5,
            rerank_score_threshold: 0.5,
            ..Default::default()
        });
        RerankStage::new(ranker, config, Arc::new(Semaphore::new(4)))
    }

    #[tokio::test]
    async fn success_replaces_scores_and_order() {
        let ranker = FixedRanker {
            records: vec![
                RankedRecord {
                    id: "b".to_string(),
                    score: 0.9,
                },
                RankedRecord {
                    id: "a".to_string(),
                    score: 0.6,
                },
            ],
        };
        let stage = stage(Arc::new(ranker));
        let input = vec![
            candidate("a", 0.8, SourceType::Vector),
            candidate("b", 0.7, SourceType::Vector),
        ];
        let (out, degraded) = stage.rerank(input, "query").await;
        assert!(degraded.is_none());
        assert_eq!(out[0].id, "b");
        assert!((out[0].score - 0.9).abs() < f64::EPSILON);
        assert!(out.iter().all(|c| c.source_type == SourceType::Reranked));
    }

    #[tokio::test]
    async fn failure_degrades_to_truncated_input_order() {
        let stage = stage(Arc::new(DownRanker));
        let input = vec![
            candidate("a", 0.8, SourceType::Vector),
            candidate("b", 0.7, SourceType::Vector),
            candidate("c", 0.2, SourceType::Vector),
        ];
        let (out, degraded) = stage.rerank(input, "query").await;
        assert!(degraded.is_some());
        // Input order preserved, low-score candidate dropped by threshold.
        let ids: Vec<_> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn threshold_spares_exact_match_sources_on_fallback() {
        let stage = stage(Arc::new(DownRanker));
        let input = vec![
            candidate("t", 0.0, SourceType::Trigger),
            candidate("p", 0.0, SourceType::Pattern),
            candidate("v", 0.1, SourceType::Vector),
        ];
        let (out, _) = stage.rerank(input, "query").await;
        let ids: Vec<_> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["t", "p"]);
    }

    #[tokio::test]
    async fn empty_input_short_circuits() {
        let stage = stage(Arc::new(DownRanker));
        let (out, degraded) = stage.rerank(Vec::new(), "query").await;
        assert!(out.is_empty());
        assert!(degraded.is_none());
    }
}
