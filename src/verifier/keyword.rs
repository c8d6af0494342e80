use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;

use super::SemanticVerifier;
use super::error::VerifierResult;
use super::types::{AssessmentRequest, VerifierVerdict};
use crate::ranking::ConfidenceTier;

const STRONG_OVERLAP: usize = 5;
const MODERATE_OVERLAP: usize = 2;

/// Judges applicability from the number of distinct words shared by the control
/// description and the documentation excerpt.
#[derive(Debug, Clone, Default)]
pub struct KeywordOverlapVerifier {
    latency: Option<Duration>,
}

impl KeywordOverlapVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps before answering, to exercise timeouts and fan-out.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
        }
    }

    pub fn shared_words(control_description: &str, excerpt: &str) -> usize {
        let control = control_description.to_lowercase();
        let doc = excerpt.to_lowercase();
        let control_words: HashSet<&str> = control.split_whitespace().collect();
        let doc_words: HashSet<&str> = doc.split_whitespace().collect();
        control_words.intersection(&doc_words).count()
    }

    pub fn judge(request: &AssessmentRequest) -> VerifierVerdict {
        let shared = Self::shared_words(&request.control_description, &request.excerpt);

        let (applicable, confidence, justification) = if shared > STRONG_OVERLAP {
            (
                true,
                ConfidenceTier::High,
                "Strong keyword match between control and documentation.",
            )
        } else if shared > MODERATE_OVERLAP {
            (
                true,
                ConfidenceTier::Medium,
                "Moderate keyword match between control and documentation.",
            )
        } else {
            (
                false,
                ConfidenceTier::Low,
                "Minimal keyword match between control and documentation.",
            )
        };

        VerifierVerdict::new(request.control_id, applicable, confidence, justification)
    }
}

#[async_trait]
impl SemanticVerifier for KeywordOverlapVerifier {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn assess(&self, request: &AssessmentRequest) -> VerifierResult<VerifierVerdict> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(Self::judge(request))
    }
}
