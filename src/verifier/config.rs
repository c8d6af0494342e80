use std::time::Duration;

use crate::constants::{DEFAULT_VERIFIER_TIMEOUT_SECS, DEFAULT_VERIFY_TOP_N};

pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-70b-instruct";
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_CHAT_PATH: &str = "/v1/chat/completions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Verifier strategy selection.
pub enum VerifierKind {
    #[default]
    /// Deterministic word-overlap judgement.
    Keyword,
    /// OpenAI-compatible chat-completions endpoint.
    Llm,
    /// Skip verification; every result stays lexical-only.
    Disabled,
}

impl std::str::FromStr for VerifierKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "keywords" => Ok(Self::Keyword),
            "llm" => Ok(Self::Llm),
            "none" | "off" | "disabled" => Ok(Self::Disabled),
            _ => Err(format!("Unknown verifier: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerifierConfig {
    pub kind: VerifierKind,
    /// Candidates sent to the verifier per request.
    pub verify_top_n: usize,
    /// Per-call timeout; a call that exceeds it degrades only its own verdict.
    pub timeout: Duration,
    /// Base URL of the chat-completions service, e.g. `http://localhost:8000`.
    pub llm_endpoint: Option<String>,
    pub llm_model: String,
    pub llm_api_key: Option<String>,
    pub temperature: f32,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            kind: VerifierKind::default(),
            verify_top_n: DEFAULT_VERIFY_TOP_N,
            timeout: Duration::from_secs(DEFAULT_VERIFIER_TIMEOUT_SECS),
            llm_endpoint: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_api_key: None,
            temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

impl VerifierConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout.is_zero() {
            return Err("verifier timeout must be greater than zero".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }

        if self.kind == VerifierKind::Llm {
            let Some(endpoint) = self.llm_endpoint.as_deref() else {
                return Err("llm verifier requires an endpoint".to_string());
            };
            reqwest::Url::parse(endpoint)
                .map_err(|e| format!("invalid llm endpoint '{}': {}", endpoint, e))?;
            if self.llm_model.trim().is_empty() {
                return Err("llm model cannot be empty".to_string());
            }
        }

        Ok(())
    }

    /// Full chat-completions URL. Endpoints that already name a path are used as given.
    pub fn chat_url(&self) -> Option<String> {
        let endpoint = self.llm_endpoint.as_deref()?.trim_end_matches('/');
        if endpoint.ends_with("/chat/completions") {
            Some(endpoint.to_string())
        } else {
            Some(format!("{}{}", endpoint, DEFAULT_CHAT_PATH))
        }
    }
}
