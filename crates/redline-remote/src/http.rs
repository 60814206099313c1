//! Shared HTTP client: versioned JSON envelope, bearer auth, timeout.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Current wire protocol version.
pub const PROTOCOL_VERSION: &str = "1.0";

/// Envelope for all service requests.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequest<T: Serialize> {
    /// Protocol version for forward compatibility.
    pub version: String,
    /// Unique request id for tracing.
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
    pub payload: T,
}

impl<T: Serialize> ServiceRequest<T> {
    pub fn new(payload: T) -> Self {
        Self {
            version: PROTOCOL_VERSION.to_string(),
            request_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            payload,
        }
    }
}

/// Envelope for all service responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceResponse<T> {
    #[allow(dead_code)]
    pub version: String,
    pub request_id: String,
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

/// Thin wrapper over `reqwest::Client` for one service endpoint.
///
/// The per-call timeout is applied at client-build time; a hung
/// collaborator call is cut off here rather than preempted anywhere
/// else in the pipeline.
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    bearer: Option<String>,
}

impl HttpClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout_secs: u64,
        bearer: Option<String>,
    ) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer,
        })
    }

    /// POST an enveloped payload and unwrap the enveloped response.
    pub async fn post_json<T: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        payload: T,
    ) -> Result<R, String> {
        let request = ServiceRequest::new(payload);
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, request_id = %request.request_id, "service request");

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("{url} returned {status}"));
        }

        let envelope: ServiceResponse<R> = response.json().await.map_err(|e| e.to_string())?;
        if !envelope.success {
            return Err(envelope
                .error
                .unwrap_or_else(|| format!("request {} failed", envelope.request_id)));
        }
        envelope
            .data
            .ok_or_else(|| format!("request {} returned no data", envelope.request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = HttpClient::new("http://svc:9000/", 5, None).unwrap();
        assert_eq!(client.base_url, "http://svc:9000");
    }

    #[test]
    fn envelope_carries_version_and_unique_ids() {
        let a = ServiceRequest::new(42);
        let b = ServiceRequest::new(42);
        assert_eq!(a.version, PROTOCOL_VERSION);
        assert_ne!(a.request_id, b.request_id);
    }
}
