use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("invalid BM25 parameters: {reason}")]
    InvalidParams { reason: String },
}
