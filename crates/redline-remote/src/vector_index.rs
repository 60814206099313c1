//! Remote vector-index client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use redline_core::config::RemoteConfig;
use redline_core::errors::{RedlineResult, RetrievalError};
use redline_core::models::{IndexHit, SearchMode};
use redline_core::traits::IVectorIndex;

use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    top_k: usize,
    mode: SearchMode,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    hits: Vec<IndexHit>,
}

/// HTTP implementation of [`IVectorIndex`].
pub struct RemoteVectorIndex {
    http: HttpClient,
}

impl RemoteVectorIndex {
    pub fn new(config: &RemoteConfig) -> RedlineResult<Self> {
        let http = HttpClient::new(
            &config.vector_index_url,
            config.request_timeout_secs,
            config.api_key.clone(),
        )
        .map_err(|reason| RetrievalError::SearchFailed { reason })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl IVectorIndex for RemoteVectorIndex {
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        mode: SearchMode,
    ) -> RedlineResult<Vec<IndexHit>> {
        let data: SearchData = self
            .http
            .post_json("search", SearchPayload { query, top_k, mode })
            .await
            .map_err(|reason| RetrievalError::SearchFailed { reason })?;
        Ok(data.hits)
    }
}
