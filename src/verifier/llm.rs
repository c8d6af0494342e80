//! Verifier backed by an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::SemanticVerifier;
use super::config::VerifierConfig;
use super::error::{VerifierError, VerifierResult};
use super::types::{AssessmentRequest, VerifierVerdict};
use crate::ranking::ConfidenceTier;

const SYSTEM_PROMPT: &str = "You are a cybersecurity expert at a financial institution. \
Your task is to assess whether a cloud service needs to comply with specific security controls.";

/// Builds the user prompt for one assessment.
pub fn build_prompt(request: &AssessmentRequest) -> String {
    format!(
        r#"CLOUD SERVICE: {service}

SECURITY DOCUMENTATION EXCERPT:
{excerpt}

ANALYST CONCERN:
{note}

CONTROL POLICY:
{control}

Based solely on the information above, assess whether the cloud service should be subject to this control policy.
Provide a confidence level (HIGH, MEDIUM, or LOW) and a brief justification (2-3 sentences maximum).

Answer in JSON format:
{{
  "is_applicable": true/false,
  "confidence": "HIGH/MEDIUM/LOW",
  "justification": "Your brief justification here"
}}"#,
        service = request.service_name,
        excerpt = request.excerpt,
        note = request.analyst_note,
        control = request.control_description,
    )
}

#[derive(Debug, Clone)]
pub struct LlmVerifier {
    http: HttpClient,
    url: String,
    model: String,
    temperature: f32,
}

impl LlmVerifier {
    pub fn new(config: &VerifierConfig) -> VerifierResult<Self> {
        config
            .validate()
            .map_err(|reason| VerifierError::InvalidConfig { reason })?;

        let url = config
            .chat_url()
            .ok_or_else(|| VerifierError::InvalidConfig {
                reason: "llm verifier requires an endpoint".to_string(),
            })?;

        let mut headers = HeaderMap::new();
        if let Some(key) = config.llm_api_key.as_deref().filter(|k| !k.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|e| {
                VerifierError::InvalidConfig {
                    reason: format!("invalid api key header: {}", e),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            url,
            model: config.llm_model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SemanticVerifier for LlmVerifier {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn assess(&self, request: &AssessmentRequest) -> VerifierResult<VerifierVerdict> {
        let body = serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(request) },
            ],
        });

        debug!(
            control_id = request.control_id,
            url = %self.url,
            "Requesting LLM assessment"
        );

        let res = self.http.post(&self.url).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(VerifierError::Unavailable {
                reason: format!("endpoint returned {}", status),
            });
        }

        let json: Value = res.json().await.map_err(|e| VerifierError::MalformedResponse {
            reason: e.to_string(),
        })?;

        parse_chat_response(request.control_id, &json)
    }
}

/// Extracts the verdict from a chat-completions response body.
pub fn parse_chat_response(control_id: u64, json: &Value) -> VerifierResult<VerifierVerdict> {
    let content = json
        .get("choices")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| VerifierError::MalformedResponse {
            reason: "response is missing message content".to_string(),
        })?;

    parse_verdict_content(control_id, content)
}

/// Parses the model's JSON answer. Surrounding prose and code fences are ignored.
pub fn parse_verdict_content(control_id: u64, content: &str) -> VerifierResult<VerifierVerdict> {
    let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) else {
        return Err(VerifierError::MalformedResponse {
            reason: "no JSON object in response".to_string(),
        });
    };
    if end < start {
        return Err(VerifierError::MalformedResponse {
            reason: "no JSON object in response".to_string(),
        });
    }

    let parsed: Value = serde_json::from_str(&content[start..=end]).map_err(|e| {
        VerifierError::MalformedResponse {
            reason: format!("invalid JSON: {}", e),
        }
    })?;

    let is_applicable = match parsed.get("is_applicable") {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => true,
        Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => false,
        _ => {
            return Err(VerifierError::MalformedResponse {
                reason: "missing or invalid is_applicable".to_string(),
            });
        }
    };

    let confidence: ConfidenceTier = parsed
        .get("confidence")
        .and_then(|v| v.as_str())
        .ok_or_else(|| VerifierError::MalformedResponse {
            reason: "missing confidence".to_string(),
        })?
        .parse()
        .map_err(|reason| VerifierError::MalformedResponse { reason })?;

    let justification = parsed
        .get("justification")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| VerifierError::MalformedResponse {
            reason: "missing justification".to_string(),
        })?;

    Ok(VerifierVerdict::new(
        control_id,
        is_applicable,
        confidence,
        justification,
    ))
}
