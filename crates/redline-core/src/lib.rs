//! # redline-core
//!
//! Foundation crate for the Redline style auditor.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::{AuditOverrides, AuditorConfig, RedlineConfig};
pub use errors::{RedlineError, RedlineResult};
pub use models::{Candidate, SourceType, StyleRule, Violation};
