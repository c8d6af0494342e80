//! Configuration error types.

use thiserror::Error;

/// Errors raised while loading or validating [`super::MapperConfig`]. All are fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A count (top-N style) could not be parsed as a non-negative integer.
    #[error("failed to parse {name} '{value}': {source}")]
    InvalidCount {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A floating point setting could not be parsed.
    #[error("failed to parse {name} '{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("unknown verifier '{value}': expected keyword, llm or none")]
    UnknownVerifier { value: String },

    #[error("invalid verifier timeout '{value}': must be a positive number of seconds")]
    InvalidTimeout { value: String },

    #[error("invalid BM25 parameters: {reason}")]
    InvalidBm25 { reason: String },

    #[error("invalid query configuration: {reason}")]
    InvalidQuery { reason: String },

    #[error("invalid verifier configuration: {reason}")]
    InvalidVerifier { reason: String },
}
