/// Rule catalog collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("rule lookup failed: {reason}")]
    LookupFailed { reason: String },

    #[error("trigger listing failed: {reason}")]
    TriggerListingFailed { reason: String },

    #[error("pattern listing failed: {reason}")]
    PatternListingFailed { reason: String },
}
