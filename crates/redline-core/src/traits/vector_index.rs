use async_trait::async_trait;

use crate::errors::RedlineResult;
use crate::models::{IndexHit, SearchMode};

/// Similarity search against the external embedding index.
#[async_trait]
pub trait IVectorIndex: Send + Sync {
    /// Run one similarity query, returning up to `top_k` scored hits,
    /// best first. Hit metadata carries the rule's term and url.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        mode: SearchMode,
    ) -> RedlineResult<Vec<IndexHit>>;
}
