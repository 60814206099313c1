//! Configuration for the Redline workspace.
//!
//! Every component receives its configuration explicitly at construction
//! time — there is no ambient global state. The per-run [`AuditorConfig`]
//! is frozen before any concurrent work starts; tasks share it behind an
//! `Arc` and never mutate it.

mod auditor_config;
mod defaults;
mod overrides;
mod remote_config;

pub use auditor_config::AuditorConfig;
pub use defaults::*;
pub use overrides::AuditOverrides;
pub use remote_config::RemoteConfig;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Workspace-level configuration: auditor defaults plus remote endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RedlineConfig {
    pub auditor: AuditorConfig,
    pub remote: RemoteConfig,
}

impl RedlineConfig {
    /// Parse a TOML document. Missing sections and fields fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|e| ConfigError::Parse {
            reason: e.to_string(),
        })?;
        config.auditor.validate()?;
        Ok(config)
    }
}
