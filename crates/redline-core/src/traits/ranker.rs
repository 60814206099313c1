use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::RedlineResult;

/// A (id, content) pair submitted for semantic ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankRecord {
    pub id: String,
    pub content: String,
}

/// A re-scored record returned by the ranking service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedRecord {
    pub id: String,
    pub score: f64,
}

/// External semantic ranking service: re-scores (query, content) pairs
/// with a more precise (and costlier) model than the retriever's.
#[async_trait]
pub trait ISemanticRanker: Send + Sync {
    /// Rank `records` against `query`, returning up to `top_n` records
    /// ordered by score descending.
    async fn rank(
        &self,
        query: &str,
        records: Vec<RankRecord>,
        top_n: usize,
    ) -> RedlineResult<Vec<RankedRecord>>;
}
