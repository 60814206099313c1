//! The vector source: baseline hybrid search, optionally behind query
//! fusion. The only scored source.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use redline_core::config::AuditorConfig;
use redline_core::errors::RedlineResult;
use redline_core::traits::IGenerativeModel;

use crate::search::fusion::FusionRetriever;
use crate::search::retriever::VectorRetriever;

use super::{RuleSource, SourceOutcome};

/// Semantic similarity source.
pub struct VectorSource {
    retriever: Arc<VectorRetriever>,
    /// Present when query fusion is enabled for this run.
    fusion: Option<FusionRetriever>,
}

impl VectorSource {
    pub fn new(
        retriever: Arc<VectorRetriever>,
        model: Arc<dyn IGenerativeModel>,
        config: Arc<AuditorConfig>,
        gate: Arc<Semaphore>,
    ) -> Self {
        let fusion = config
            .use_query_fusion
            .then(|| FusionRetriever::new(Arc::clone(&retriever), model, config, gate));
        Self { retriever, fusion }
    }
}

#[async_trait]
impl RuleSource for VectorSource {
    fn name(&self) -> &'static str {
        "vector"
    }

    async fn gather(&self, text: &str) -> RedlineResult<SourceOutcome> {
        let (candidates, degradation) = match &self.fusion {
            Some(fusion) => fusion.retrieve(text).await?,
            None => (self.retriever.retrieve(text).await?, None),
        };
        Ok(SourceOutcome {
            candidates,
            degradation,
            ..Default::default()
        })
    }
}
