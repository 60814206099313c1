//! Baseline hybrid retrieval with per-query result caching.

use std::sync::Arc;

use moka::sync::Cache;
use tokio::sync::Semaphore;
use tracing::debug;

use redline_core::config::{AuditorConfig, DEFAULT_QUERY_CACHE_CAPACITY};
use redline_core::errors::{RedlineResult, RetrievalError};
use redline_core::models::{Candidate, SearchMode, SourceType};
use redline_core::traits::IVectorIndex;

/// Baseline retriever: one hybrid similarity query against the external
/// index, gated by the shared request semaphore.
///
/// Results are cached per (query, top_k). The cache is sound because
/// rule ids are content-addressed — a rule's id changes whenever its
/// text does, so a cached hit can never go stale within a catalog
/// generation.
pub struct VectorRetriever {
    index: Arc<dyn IVectorIndex>,
    config: Arc<AuditorConfig>,
    gate: Arc<Semaphore>,
    cache: Cache<String, Arc<Vec<Candidate>>>,
}

impl VectorRetriever {
    pub fn new(
        index: Arc<dyn IVectorIndex>,
        config: Arc<AuditorConfig>,
        gate: Arc<Semaphore>,
    ) -> Self {
        Self {
            index,
            config,
            gate,
            cache: Cache::new(DEFAULT_QUERY_CACHE_CAPACITY),
        }
    }

    /// Run one baseline hybrid query, returning scored candidates
    /// best-first. This is also the only retrieval path the agent uses
    /// for additional-context queries.
    pub async fn retrieve(&self, query: &str) -> RedlineResult<Vec<Candidate>> {
        let top_k = self.config.initial_retrieval_count;
        let key = cache_key(query, top_k);

        if let Some(cached) = self.cache.get(&key) {
            debug!(query, "retrieval cache hit");
            return Ok(cached.as_ref().clone());
        }

        let hits = {
            let _permit = self.gate.acquire().await.map_err(|e| {
                RetrievalError::SearchFailed {
                    reason: format!("request gate closed: {e}"),
                }
            })?;
            self.index.search(query, top_k, SearchMode::Hybrid).await?
        };

        let mut candidates: Vec<Candidate> = hits
            .into_iter()
            .map(|hit| Candidate::from_hit(hit, SourceType::Vector))
            .collect();
        // The index returns hits best-first; enforce it anyway so RRF
        // ranks never depend on a collaborator quirk.
        candidates.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        debug!(query, count = candidates.len(), "retrieved candidates");
        self.cache.insert(key, Arc::new(candidates.clone()));
        Ok(candidates)
    }
}

fn cache_key(query: &str, top_k: usize) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(query.as_bytes());
    hasher.update(&top_k.to_le_bytes());
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_separates_query_and_top_k() {
        assert_ne!(cache_key("a", 10), cache_key("a", 20));
        assert_ne!(cache_key("a", 10), cache_key("b", 10));
        assert_eq!(cache_key("a", 10), cache_key("a", 10));
    }
}
