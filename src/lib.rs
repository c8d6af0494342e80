//! Two-stage compliance control mapping.
//!
//! Given a catalog of security controls and a cloud service's documentation, the crate
//! ranks controls lexically (BM25), sends a bounded subset to a semantic verifier, and
//! merges both into one explainable result per control.
//!
//! # Modules
//!
//! - [`text`] - tokenization and stop words
//! - [`catalog`] - CSV control catalog
//! - [`ranking`] - BM25 index, normalization, tiers and top-N selection
//! - [`query`] - section-marker excerpts and query composition
//! - [`document`] - document-to-text sources
//! - [`verifier`] - semantic verification strategies and timeout handling
//! - [`merge`] - provenance-tagged result merging
//! - [`output`] - reports, JSON views and summary
//! - [`pipeline`] - [`ControlMapper`], the end-to-end request path
//! - [`config`] - `CTRLMAP_*` environment configuration
//!
//! ## Test/Mock Support
//! [`verifier::MockVerifier`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod catalog;
pub mod config;
pub mod constants;
pub mod document;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod ranking;
pub mod text;
pub mod verifier;

pub use catalog::{Catalog, CatalogLoadError, ControlRecord};
pub use config::{ConfigError, MapperConfig};
pub use document::{DocumentReadError, DocumentSource, InlineText, PageRange, TextFile};
pub use merge::{MergeContext, MergedMapping, MergedResult, Provenance, merge, merge_with_context};
pub use output::{MappingReport, MappingStats, write_json};
pub use pipeline::{ControlMapper, MapperError, MappingRequest};
pub use query::{QueryComposer, QueryConfig, SectionMarker};
pub use ranking::{
    Bm25Index, Bm25Params, ConfidenceTier, LexicalRanker, RankedCandidate, normalize_scores,
    select_top,
};
pub use text::{TextPreprocessor, TokenSequence};
pub use verifier::{
    AssessmentRequest, KeywordOverlapVerifier, LlmVerifier, SemanticVerifier, VerifierConfig,
    VerifierError, VerifierKind, VerifierVerdict, assess_with_timeout, select_for_verification,
};
