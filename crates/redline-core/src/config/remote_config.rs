use serde::{Deserialize, Serialize};

use super::defaults;

/// Endpoints and transport settings for the remote collaborator clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub vector_index_url: String,
    pub generative_url: String,
    pub ranker_url: String,
    pub catalog_url: String,
    /// Bearer token attached to every request when set.
    pub api_key: Option<String>,
    /// Per-call timeout. A hung collaborator call is cut off here; no
    /// other cancellation is imposed.
    pub request_timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            vector_index_url: "http://localhost:8091".to_string(),
            generative_url: "http://localhost:8092".to_string(),
            ranker_url: "http://localhost:8093".to_string(),
            catalog_url: "http://localhost:8094".to_string(),
            api_key: None,
            request_timeout_secs: defaults::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}
