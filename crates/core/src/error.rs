use thiserror::Error;

use crate::types::SessionPhase;

#[derive(Error, Debug)]
pub enum KesitError {
    #[error("Invalid YouTube link: {input:?}. Please check the link and try again.")]
    InvalidLink { input: String },

    #[error("Missing API key: {env_var} environment variable is not set")]
    CredentialMissing { env_var: String },

    #[error(transparent)]
    ExternalService(#[from] ExternalServiceError),

    #[error(transparent)]
    ResponseFormat(#[from] ResponseFormatError),

    #[error("Session step is not allowed while {phase:?}")]
    OutOfSequence { phase: SessionPhase },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl KesitError {
    /// Whether re-submitting the same link can succeed without changing input or configuration.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            KesitError::ExternalService(_) | KesitError::ResponseFormat(_)
        )
    }
}

/// Failures reported by the external analysis service.
#[derive(Error, Debug)]
pub enum ExternalServiceError {
    #[error("Analysis service is unreachable: {reason}")]
    Unreachable { reason: String },

    #[error("Model not found ({model}). Make sure your API key has access to this model.")]
    ModelNotFound { model: String },

    #[error(
        "Search grounding cannot be combined with a strict JSON schema. Please try again."
    )]
    ConfigConflict,

    #[error("Analysis service returned an empty response")]
    EmptyResponse,

    #[error("Analysis failed: {message}")]
    Failed { message: String },
}

#[derive(Error, Debug)]
pub enum ResponseFormatError {
    #[error("AI response is not valid JSON. Please try again. ({0})")]
    NotJson(#[source] serde_json::Error),

    #[error("AI response is missing or malformed clips field. Please try again.")]
    MalformedClips,
}

pub type Result<T> = std::result::Result<T, KesitError>;
