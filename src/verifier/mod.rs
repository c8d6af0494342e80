//! Second-pass semantic verification.
//!
//! A [`SemanticVerifier`] judges one (service, control) pair at a time. Callers go
//! through [`assess_with_timeout`], which never fails: timeouts, transport errors and
//! malformed answers all become a degraded verdict (not applicable, low confidence,
//! reason in the justification). Only a bounded subset of lexical candidates, picked by
//! [`select_for_verification`], is ever sent here.

pub mod config;
pub mod error;
pub mod keyword;
pub mod llm;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::{VerifierConfig, VerifierKind};
pub use error::{VerifierError, VerifierResult};
pub use keyword::KeywordOverlapVerifier;
pub use llm::LlmVerifier;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockResponse, MockVerifier};
pub use types::{AssessmentRequest, VerifierVerdict};

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::ranking::RankedCandidate;

#[async_trait]
/// Request/response judgement of whether a control applies to a service.
pub trait SemanticVerifier: Send + Sync {
    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;

    async fn assess(&self, request: &AssessmentRequest) -> VerifierResult<VerifierVerdict>;
}

/// Runs one assessment under `timeout`, degrading the verdict on any failure.
pub async fn assess_with_timeout(
    verifier: &dyn SemanticVerifier,
    request: &AssessmentRequest,
    timeout: Duration,
) -> VerifierVerdict {
    let outcome = match tokio::time::timeout(timeout, verifier.assess(request)).await {
        Ok(result) => result,
        Err(_) => Err(VerifierError::Timeout { timeout }),
    };

    match outcome {
        Ok(mut verdict) => {
            verdict.control_id = request.control_id;
            debug!(
                verifier = verifier.name(),
                control_id = request.control_id,
                applicable = verdict.is_applicable,
                confidence = %verdict.confidence,
                "Verifier verdict received"
            );
            verdict
        }
        Err(e) => {
            warn!(
                verifier = verifier.name(),
                control_id = request.control_id,
                error = %e,
                "Verifier call failed, degrading verdict"
            );
            VerifierVerdict::degraded(request.control_id, &e)
        }
    }
}

/// Picks at most `limit` candidates: highest tier first, then lexical rank. A control id
/// is selected once; later candidates repeating it are skipped.
pub fn select_for_verification(candidates: &[RankedCandidate], limit: usize) -> Vec<&RankedCandidate> {
    let mut ordered: Vec<&RankedCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.tier.rank());

    let mut seen = HashSet::with_capacity(ordered.len());
    ordered.retain(|c| seen.insert(c.control_id));
    ordered.truncate(limit);
    ordered
}

/// Builds the configured verifier, or `None` when verification is disabled.
pub fn build_verifier(config: &VerifierConfig) -> VerifierResult<Option<Arc<dyn SemanticVerifier>>> {
    match config.kind {
        VerifierKind::Keyword => Ok(Some(Arc::new(KeywordOverlapVerifier::new()))),
        VerifierKind::Llm => Ok(Some(Arc::new(LlmVerifier::new(config)?))),
        VerifierKind::Disabled => Ok(None),
    }
}
