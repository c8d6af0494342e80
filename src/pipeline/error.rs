use thiserror::Error;

use crate::catalog::CatalogLoadError;
use crate::config::ConfigError;
use crate::ranking::RankingError;

/// Construction failures. A constructed mapper never fails a request.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error(transparent)]
    Catalog(#[from] CatalogLoadError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ranking(#[from] RankingError),
}
