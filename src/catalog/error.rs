use std::path::PathBuf;
use thiserror::Error;

/// Fatal: without a catalog there is nothing to rank.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("control catalog not found at {path}")]
    NotFound { path: PathBuf },

    #[error("failed to read control catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read control catalog: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },
}
