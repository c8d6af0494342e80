//! Lexical retrieval stage.
//!
//! [`LexicalRanker`] owns the [`Catalog`] and a [`Bm25Index`] built over its preprocessed
//! descriptions. Raw BM25 scores are turned into candidates in three steps:
//!
//! 1. [`normalize_scores`] divides by the batch maximum (all zeros when the maximum is zero)
//! 2. [`ConfidenceTier::from_score`] labels each normalized score
//! 3. [`select_top`] sorts by normalized score, ties by catalog position, and keeps `top_n`

pub mod bm25;
pub mod error;
pub mod types;


pub use bm25::{Bm25Index, Bm25Params};
pub use error::RankingError;
pub use types::{ConfidenceTier, RankedCandidate};

use std::cmp::Ordering;

use tracing::debug;

use crate::catalog::Catalog;
use crate::text::{TextPreprocessor, TokenSequence};

#[derive(Debug)]
pub struct LexicalRanker {
    catalog: Catalog,
    index: Bm25Index,
    preprocessor: TextPreprocessor,
}

impl LexicalRanker {
    /// Tokenizes every description and builds the index. Runs once per catalog.
    pub fn build(
        catalog: Catalog,
        params: Bm25Params,
        preprocessor: TextPreprocessor,
    ) -> Result<Self, RankingError> {
        params
            .validate()
            .map_err(|reason| RankingError::InvalidParams { reason })?;

        Ok(Self::index_catalog(catalog, params, preprocessor))
    }

    /// Default BM25 parameters and the English preprocessor.
    pub fn with_defaults(catalog: Catalog) -> Self {
        Self::index_catalog(catalog, Bm25Params::default(), TextPreprocessor::english())
    }

    fn index_catalog(catalog: Catalog, params: Bm25Params, preprocessor: TextPreprocessor) -> Self {
        let documents: Vec<TokenSequence> = catalog
            .iter()
            .map(|record| preprocessor.normalize(&record.description))
            .collect();
        let index = Bm25Index::build(&documents, params);

        Self {
            catalog,
            index,
            preprocessor,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn index(&self) -> &Bm25Index {
        &self.index
    }

    pub fn preprocessor(&self) -> &TextPreprocessor {
        &self.preprocessor
    }

    /// Raw BM25 score for every catalog position, in position order.
    pub fn score(&self, query: &TokenSequence) -> Vec<(usize, f32)> {
        self.index.score(query)
    }

    /// Scores, normalizes, labels and keeps the `top_n` best candidates.
    pub fn rank(&self, query: &TokenSequence, top_n: usize) -> Vec<RankedCandidate> {
        let raw = self.score(query);
        let candidates = select_top(&self.catalog, &raw, top_n);

        debug!(
            query_tokens = query.len(),
            catalog_size = self.catalog.len(),
            selected = candidates.len(),
            top_score = candidates.first().map(|c| c.raw_score),
            "Lexical ranking complete"
        );

        candidates
    }
}

/// Divides each raw score by the batch maximum. A non-positive maximum yields all zeros.
pub fn normalize_scores(raw: &[(usize, f32)]) -> Vec<(usize, f32)> {
    let max = raw
        .iter()
        .map(|&(_, score)| score)
        .fold(f32::NEG_INFINITY, f32::max);

    if !max.is_finite() || max <= 0.0 {
        return raw.iter().map(|&(pos, _)| (pos, 0.0)).collect();
    }

    raw.iter()
        .map(|&(pos, score)| (pos, (score / max).clamp(0.0, 1.0)))
        .collect()
}

/// Normalizes `raw`, sorts descending (ties by position ascending) and keeps `top_n`.
pub fn select_top(catalog: &Catalog, raw: &[(usize, f32)], top_n: usize) -> Vec<RankedCandidate> {
    let normalized = normalize_scores(raw);

    let mut scored: Vec<(usize, f32, f32)> = raw
        .iter()
        .zip(normalized)
        .map(|(&(pos, raw_score), (_, norm))| (pos, raw_score, norm))
        .collect();

    scored.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });

    scored
        .into_iter()
        .filter_map(|(position, raw_score, normalized_score)| {
            let record = catalog.get(position)?;
            Some(RankedCandidate {
                position,
                control_id: record.id,
                raw_score,
                normalized_score,
                tier: ConfidenceTier::from_score(normalized_score),
            })
        })
        .take(top_n)
        .collect()
}
