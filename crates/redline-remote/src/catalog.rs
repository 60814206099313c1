//! Remote rule-catalog client.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use redline_core::config::RemoteConfig;
use redline_core::errors::{CatalogError, RedlineResult};
use redline_core::models::{RulePattern, RuleTrigger, StyleRule};
use redline_core::traits::IRuleCatalog;

use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct RulesByIdPayload {
    ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RulesData {
    rules: Vec<StyleRule>,
}

#[derive(Debug, Deserialize)]
struct TriggersData {
    triggers: Vec<RuleTrigger>,
}

#[derive(Debug, Deserialize)]
struct PatternsData {
    patterns: Vec<RulePattern>,
}

/// HTTP implementation of [`IRuleCatalog`].
pub struct RemoteRuleCatalog {
    http: HttpClient,
}

impl RemoteRuleCatalog {
    pub fn new(config: &RemoteConfig) -> RedlineResult<Self> {
        let http = HttpClient::new(
            &config.catalog_url,
            config.request_timeout_secs,
            config.api_key.clone(),
        )
        .map_err(|reason| CatalogError::LookupFailed { reason })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl IRuleCatalog for RemoteRuleCatalog {
    async fn rules_by_id(&self, ids: &HashSet<String>) -> RedlineResult<Vec<StyleRule>> {
        // Sorted for a deterministic request body (and cache-friendly
        // upstream).
        let mut ids: Vec<String> = ids.iter().cloned().collect();
        ids.sort();
        let data: RulesData = self
            .http
            .post_json("rules/by-id", RulesByIdPayload { ids })
            .await
            .map_err(|reason| CatalogError::LookupFailed { reason })?;
        Ok(data.rules)
    }

    async fn list_triggers(&self) -> RedlineResult<Vec<RuleTrigger>> {
        let data: TriggersData = self
            .http
            .post_json("rules/triggers", ())
            .await
            .map_err(|reason| CatalogError::TriggerListingFailed { reason })?;
        Ok(data.triggers)
    }

    async fn list_patterns(&self) -> RedlineResult<Vec<RulePattern>> {
        let data: PatternsData = self
            .http
            .post_json("rules/patterns", ())
            .await
            .map_err(|reason| CatalogError::PatternListingFailed { reason })?;
        Ok(data.patterns)
    }
}
