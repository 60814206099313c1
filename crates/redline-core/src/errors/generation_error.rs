/// Generative-model collaborator errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("completion call failed: {reason}")]
    CompletionFailed { reason: String },

    #[error("model output did not match the expected schema: {reason}")]
    MalformedResponse { reason: String },
}
