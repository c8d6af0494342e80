use serde::{Deserialize, Serialize};

use crate::constants::{UNAVAILABLE_JUSTIFICATION, VERIFIER_EXCERPT_CHARS};
use crate::ranking::ConfidenceTier;
use crate::text::truncate_chars;

/// Inputs for one (service, control) judgement. The excerpt is already bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentRequest {
    pub control_id: u64,
    pub service_name: String,
    pub excerpt: String,
    pub analyst_note: String,
    pub control_description: String,
}

impl AssessmentRequest {
    pub fn new(
        control_id: u64,
        service_name: &str,
        excerpt: &str,
        analyst_note: &str,
        control_description: &str,
    ) -> Self {
        Self {
            control_id,
            service_name: service_name.to_string(),
            excerpt: truncate_chars(excerpt, VERIFIER_EXCERPT_CHARS).to_string(),
            analyst_note: analyst_note.to_string(),
            control_description: control_description.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierVerdict {
    pub control_id: u64,
    pub is_applicable: bool,
    pub confidence: ConfidenceTier,
    pub justification: String,
    /// Set when the verdict stands in for a failed assessment.
    #[serde(default)]
    pub degraded: bool,
}

impl VerifierVerdict {
    pub fn new(
        control_id: u64,
        is_applicable: bool,
        confidence: ConfidenceTier,
        justification: impl Into<String>,
    ) -> Self {
        Self {
            control_id,
            is_applicable,
            confidence,
            justification: justification.into(),
            degraded: false,
        }
    }

    /// Not applicable, low confidence, with the failure reason in the justification.
    pub fn degraded(control_id: u64, reason: impl std::fmt::Display) -> Self {
        Self {
            control_id,
            is_applicable: false,
            confidence: ConfidenceTier::Low,
            justification: format!("{}: {}", UNAVAILABLE_JUSTIFICATION, reason),
            degraded: true,
        }
    }
}
