//! Remote generative-model client.
//!
//! The structured variants request raw JSON from the completion service
//! and parse it locally, stripping markdown code fences the model may
//! wrap around its output.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use redline_core::config::{AuditorConfig, RemoteConfig};
use redline_core::errors::{GenerationError, RedlineResult};
use redline_core::models::{AuditIterationResult, FusionPlan};
use redline_core::traits::IGenerativeModel;

use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct CompletePayload<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct CompleteData {
    text: String,
}

/// HTTP implementation of [`IGenerativeModel`].
pub struct RemoteGenerativeModel {
    http: HttpClient,
    model_name: String,
    temperature: f64,
}

impl RemoteGenerativeModel {
    pub fn new(remote: &RemoteConfig, auditor: &AuditorConfig) -> RedlineResult<Self> {
        let http = HttpClient::new(
            &remote.generative_url,
            remote.request_timeout_secs,
            remote.api_key.clone(),
        )
        .map_err(|reason| GenerationError::CompletionFailed { reason })?;
        Ok(Self {
            http,
            model_name: auditor.model_name.clone(),
            temperature: auditor.temperature,
        })
    }

    async fn complete_text(&self, prompt: &str) -> RedlineResult<String> {
        let data: CompleteData = self
            .http
            .post_json(
                "complete",
                CompletePayload {
                    model: &self.model_name,
                    prompt,
                    temperature: self.temperature,
                },
            )
            .await
            .map_err(|reason| GenerationError::CompletionFailed { reason })?;
        Ok(data.text)
    }

    async fn complete_parsed<T: DeserializeOwned>(&self, prompt: &str) -> RedlineResult<T> {
        let text = self.complete_text(prompt).await?;
        let cleaned = strip_json_fence(&text);
        serde_json::from_str(cleaned).map_err(|e| {
            GenerationError::MalformedResponse {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[async_trait]
impl IGenerativeModel for RemoteGenerativeModel {
    async fn complete(&self, prompt: &str) -> RedlineResult<String> {
        self.complete_text(prompt).await
    }

    async fn complete_audit(&self, prompt: &str) -> RedlineResult<AuditIterationResult> {
        self.complete_parsed(prompt).await
    }

    async fn complete_fusion_plan(&self, prompt: &str) -> RedlineResult<FusionPlan> {
        self.complete_parsed(prompt).await
    }
}

/// Strip a surrounding markdown code fence, if any.
fn strip_json_fence(text: &str) -> &str {
    let mut cleaned = text.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_json_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_json_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_json_fence("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn parses_fenced_audit_result() {
        let raw = "```json\n{\"violations\": [], \"confident\": true, \"needs_more_context\": false, \"additional_queries\": []}\n```";
        let parsed: AuditIterationResult = serde_json::from_str(strip_json_fence(raw)).unwrap();
        assert!(parsed.confident);
        assert!(parsed.violations.is_empty());
    }
}
