use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::SemanticVerifier;
use super::error::{VerifierError, VerifierResult};
use super::types::{AssessmentRequest, VerifierVerdict};
use crate::ranking::ConfidenceTier;

#[derive(Debug, Clone)]
pub enum MockResponse {
    Verdict {
        is_applicable: bool,
        confidence: ConfidenceTier,
        justification: String,
    },
    Unavailable(String),
    Malformed(String),
}

/// Scripted verifier: per-control responses and delays, with a call log.
#[derive(Debug)]
pub struct MockVerifier {
    responses: HashMap<u64, MockResponse>,
    delays: HashMap<u64, Duration>,
    fallback: MockResponse,
    calls: Mutex<Vec<u64>>,
}

impl Default for MockVerifier {
    fn default() -> Self {
        Self {
            responses: HashMap::new(),
            delays: HashMap::new(),
            fallback: MockResponse::Verdict {
                is_applicable: true,
                confidence: ConfidenceTier::Medium,
                justification: "mock verdict".to_string(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MockVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verdict(
        mut self,
        control_id: u64,
        is_applicable: bool,
        confidence: ConfidenceTier,
        justification: &str,
    ) -> Self {
        self.responses.insert(
            control_id,
            MockResponse::Verdict {
                is_applicable,
                confidence,
                justification: justification.to_string(),
            },
        );
        self
    }

    pub fn with_failure(mut self, control_id: u64, reason: &str) -> Self {
        self.responses
            .insert(control_id, MockResponse::Unavailable(reason.to_string()));
        self
    }

    pub fn with_malformed(mut self, control_id: u64, reason: &str) -> Self {
        self.responses
            .insert(control_id, MockResponse::Malformed(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, control_id: u64, delay: Duration) -> Self {
        self.delays.insert(control_id, delay);
        self
    }

    pub fn with_fallback(mut self, fallback: MockResponse) -> Self {
        self.fallback = fallback;
        self
    }

    /// Control ids in the order their calls started.
    pub fn calls(&self) -> Vec<u64> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SemanticVerifier for MockVerifier {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn assess(&self, request: &AssessmentRequest) -> VerifierResult<VerifierVerdict> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.control_id);
        }

        if let Some(delay) = self.delays.get(&request.control_id) {
            tokio::time::sleep(*delay).await;
        }

        let response = self
            .responses
            .get(&request.control_id)
            .unwrap_or(&self.fallback);

        match response {
            MockResponse::Verdict {
                is_applicable,
                confidence,
                justification,
            } => Ok(VerifierVerdict::new(
                request.control_id,
                *is_applicable,
                *confidence,
                justification.clone(),
            )),
            MockResponse::Unavailable(reason) => Err(VerifierError::Unavailable {
                reason: reason.clone(),
            }),
            MockResponse::Malformed(reason) => Err(VerifierError::MalformedResponse {
                reason: reason.clone(),
            }),
        }
    }
}
