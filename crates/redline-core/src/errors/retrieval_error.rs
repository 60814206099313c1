/// Retrieval subsystem errors.
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    #[error("search failed: {reason}")]
    SearchFailed { reason: String },

    #[error("every gathering source failed: {reasons:?}")]
    AllSourcesFailed { reasons: Vec<String> },

    #[error("trigger automaton build failed: {reason}")]
    MatcherBuildFailed { reason: String },
}

/// Rerank stage errors. These never abort an audit — the stage degrades
/// to unranked truncation — but the underlying cause is still typed.
#[derive(Debug, thiserror::Error)]
pub enum RerankError {
    #[error("ranking service failed: {reason}")]
    ServiceFailed { reason: String },
}
