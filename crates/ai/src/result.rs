use std::time::Duration;

use thiserror::Error;

/// Failure of a language-model call.
///
/// None of these are fatal to planning: callers degrade to a deterministic
/// path and record the reason.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AiError {
    #[error("language model unavailable: {0}")]
    Unavailable(String),

    #[error("language model timed out after {0:?}")]
    Timeout(Duration),

    #[error("language model returned unusable output: {0}")]
    InvalidOutput(String),

    #[error("no backend configured for model '{0}'")]
    UnknownModel(String),

    #[error("invalid model request: {0}")]
    InvalidRequest(String),
}

impl AiError {
    /// Transient failures worth one more attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AiError::Unavailable(_) | AiError::Timeout(_))
    }
}
