//! Cross-cutting, shared constants.
//!
//! These are the defaults behind [`MapperConfig`](crate::config::MapperConfig) and the
//! per-component configs. Prefer passing a config value over reading these directly.

/// Number of lexical candidates kept after BM25 ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// Number of lexical candidates re-checked by the semantic verifier.
pub const DEFAULT_VERIFY_TOP_N: usize = 5;

/// Per-call verifier timeout.
pub const DEFAULT_VERIFIER_TIMEOUT_SECS: u64 = 30;

/// Normalized scores strictly above this map to [`ConfidenceTier::High`](crate::ranking::ConfidenceTier::High).
pub const HIGH_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Normalized scores strictly above this map to [`ConfidenceTier::Medium`](crate::ranking::ConfidenceTier::Medium).
pub const MEDIUM_CONFIDENCE_THRESHOLD: f32 = 0.4;

pub const DEFAULT_BM25_K1: f32 = 1.5;
pub const DEFAULT_BM25_B: f32 = 0.75;

/// Characters of raw text used as the excerpt when no security marker is found.
pub const FALLBACK_EXCERPT_CHARS: usize = 40_000;

/// Characters of the excerpt folded into the lexical query.
pub const QUERY_EXCERPT_CHARS: usize = 5_000;

/// Characters of the excerpt sent to the semantic verifier.
pub const VERIFIER_EXCERPT_CHARS: usize = 2_000;

/// Justification attached to results that never reached the verifier.
pub const LEXICAL_JUSTIFICATION: &str = "Based on BM25 retrieval score";

/// Prefix of the justification attached to degraded verdicts.
pub const UNAVAILABLE_JUSTIFICATION: &str = "assessment unavailable";

/// Number of merged results rendered in the human-readable summary.
pub const SUMMARY_TOP_MATCHES: usize = 5;
