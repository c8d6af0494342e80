use std::path::PathBuf;
use thiserror::Error;

/// Recoverable: the pipeline continues with an empty excerpt.
#[derive(Debug, Error)]
pub enum DocumentReadError {
    #[error("document not found: {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
