use std::time::Duration;
use thiserror::Error;

/// Recoverable per candidate: turned into a degraded verdict, never propagated.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("verifier unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("verifier timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("malformed verifier response: {reason}")]
    MalformedResponse { reason: String },

    #[error("verifier request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid verifier configuration: {reason}")]
    InvalidConfig { reason: String },
}

pub type VerifierResult<T> = Result<T, VerifierError>;
