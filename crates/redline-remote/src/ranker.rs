//! Remote semantic ranking client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use redline_core::config::RemoteConfig;
use redline_core::errors::{RedlineResult, RerankError};
use redline_core::traits::{ISemanticRanker, RankRecord, RankedRecord};

use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct RankPayload<'a> {
    query: &'a str,
    records: Vec<RankRecord>,
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct RankData {
    records: Vec<RankedRecord>,
}

/// HTTP implementation of [`ISemanticRanker`].
pub struct RemoteSemanticRanker {
    http: HttpClient,
}

impl RemoteSemanticRanker {
    pub fn new(config: &RemoteConfig) -> RedlineResult<Self> {
        let http = HttpClient::new(
            &config.ranker_url,
            config.request_timeout_secs,
            config.api_key.clone(),
        )
        .map_err(|reason| RerankError::ServiceFailed { reason })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl ISemanticRanker for RemoteSemanticRanker {
    async fn rank(
        &self,
        query: &str,
        records: Vec<RankRecord>,
        top_n: usize,
    ) -> RedlineResult<Vec<RankedRecord>> {
        let data: RankData = self
            .http
            .post_json(
                "rank",
                RankPayload {
                    query,
                    records,
                    top_n,
                },
            )
            .await
            .map_err(|reason| RerankError::ServiceFailed { reason })?;

        // The contract says descending by score; enforce it locally so a
        // sloppy service cannot scramble the truncation downstream.
        let mut ranked = data.records;
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(ranked)
    }
}
