use std::time::Duration;

use super::llm::{build_prompt, parse_chat_response, parse_verdict_content};
use super::*;
use crate::ranking::{ConfidenceTier, RankedCandidate};

fn request(control_id: u64, control: &str, excerpt: &str) -> AssessmentRequest {
    AssessmentRequest::new(control_id, "Acme Storage", excerpt, "stores PII", control)
}

fn candidate(position: usize, control_id: u64, score: f32) -> RankedCandidate {
    RankedCandidate {
        position,
        control_id,
        raw_score: score,
        normalized_score: score,
        tier: ConfidenceTier::from_score(score),
    }
}

#[test]
fn test_request_truncates_excerpt() {
    let long = "é".repeat(5000);
    let req = request(1, "control", &long);
    assert_eq!(req.excerpt.chars().count(), crate::constants::VERIFIER_EXCERPT_CHARS);
}

#[test]
fn test_degraded_verdict_shape() {
    let verdict = VerifierVerdict::degraded(7, "connection refused");
    assert_eq!(verdict.control_id, 7);
    assert!(!verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::Low);
    assert!(verdict.degraded);
    assert_eq!(
        verdict.justification,
        "assessment unavailable: connection refused"
    );
}

#[test]
fn test_keyword_strong_overlap() {
    let req = request(
        1,
        "encrypt customer data at rest using managed keys",
        "we encrypt customer data at rest using managed keys always",
    );
    let verdict = KeywordOverlapVerifier::judge(&req);
    assert!(verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::High);
    assert!(verdict.justification.starts_with("Strong"));
}

#[test]
fn test_keyword_moderate_overlap() {
    let req = request(1, "encrypt customer data daily", "encrypt customer data");
    let verdict = KeywordOverlapVerifier::judge(&req);
    assert!(verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::Medium);
}

#[test]
fn test_keyword_minimal_overlap() {
    let req = request(1, "firewall rules", "encrypt customer data");
    let verdict = KeywordOverlapVerifier::judge(&req);
    assert!(!verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::Low);
    assert!(verdict.justification.starts_with("Minimal"));
}

#[test]
fn test_keyword_overlap_counts_distinct_words() {
    assert_eq!(
        KeywordOverlapVerifier::shared_words("Data data DATA", "data data"),
        1
    );
}

#[test]
fn test_parse_plain_json() {
    let content = r#"{"is_applicable": true, "confidence": "HIGH", "justification": "Stores PII."}"#;
    let verdict = parse_verdict_content(3, content).unwrap();
    assert_eq!(verdict.control_id, 3);
    assert!(verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::High);
    assert_eq!(verdict.justification, "Stores PII.");
    assert!(!verdict.degraded);
}

#[test]
fn test_parse_fenced_json_with_prose() {
    let content = "Here is my answer:\n```json\n{\"is_applicable\": \"false\", \"confidence\": \"low\", \"justification\": \"No data handled.\"}\n```";
    let verdict = parse_verdict_content(3, content).unwrap();
    assert!(!verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::Low);
}

#[test]
fn test_parse_rejects_missing_fields() {
    let content = r#"{"is_applicable": true, "confidence": "HIGH"}"#;
    assert!(matches!(
        parse_verdict_content(3, content),
        Err(VerifierError::MalformedResponse { .. })
    ));

    let content = r#"{"confidence": "HIGH", "justification": "x"}"#;
    assert!(matches!(
        parse_verdict_content(3, content),
        Err(VerifierError::MalformedResponse { .. })
    ));
}

#[test]
fn test_parse_rejects_unknown_confidence() {
    let content = r#"{"is_applicable": true, "confidence": "VERY HIGH", "justification": "x"}"#;
    assert!(matches!(
        parse_verdict_content(3, content),
        Err(VerifierError::MalformedResponse { .. })
    ));
}

#[test]
fn test_parse_rejects_non_json() {
    assert!(parse_verdict_content(3, "I cannot answer that.").is_err());
    assert!(parse_verdict_content(3, "} backwards {").is_err());
}

#[test]
fn test_parse_chat_response_envelope() {
    let body = serde_json::json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": "{\"is_applicable\": true, \"confidence\": \"MEDIUM\", \"justification\": \"Handles logs.\"}"
            }
        }]
    });
    let verdict = parse_chat_response(9, &body).unwrap();
    assert_eq!(verdict.control_id, 9);
    assert_eq!(verdict.confidence, ConfidenceTier::Medium);

    let empty = serde_json::json!({ "choices": [] });
    assert!(parse_chat_response(9, &empty).is_err());
}

#[test]
fn test_prompt_contains_all_inputs() {
    let req = request(1, "Rotate keys yearly", "We use KMS");
    let prompt = build_prompt(&req);
    assert!(prompt.contains("CLOUD SERVICE: Acme Storage"));
    assert!(prompt.contains("We use KMS"));
    assert!(prompt.contains("stores PII"));
    assert!(prompt.contains("Rotate keys yearly"));
    assert!(prompt.contains("\"is_applicable\""));
}

#[test]
fn test_verifier_kind_parsing() {
    assert_eq!("keyword".parse::<VerifierKind>().unwrap(), VerifierKind::Keyword);
    assert_eq!("LLM".parse::<VerifierKind>().unwrap(), VerifierKind::Llm);
    assert_eq!("none".parse::<VerifierKind>().unwrap(), VerifierKind::Disabled);
    assert!("oracle".parse::<VerifierKind>().is_err());
}

#[test]
fn test_config_validation() {
    assert!(VerifierConfig::default().validate().is_ok());

    let config = VerifierConfig {
        kind: VerifierKind::Llm,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = VerifierConfig {
        kind: VerifierKind::Llm,
        llm_endpoint: Some("not a url".to_string()),
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = VerifierConfig {
        timeout: Duration::ZERO,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = VerifierConfig {
        temperature: 3.0,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_chat_url() {
    let mut config = VerifierConfig {
        llm_endpoint: Some("http://localhost:8000/".to_string()),
        ..Default::default()
    };
    assert_eq!(
        config.chat_url().as_deref(),
        Some("http://localhost:8000/v1/chat/completions")
    );

    config.llm_endpoint = Some("http://host/api/chat/completions".to_string());
    assert_eq!(
        config.chat_url().as_deref(),
        Some("http://host/api/chat/completions")
    );

    config.llm_endpoint = None;
    assert!(config.chat_url().is_none());
}

#[test]
fn test_build_verifier_by_kind() {
    let keyword = build_verifier(&VerifierConfig::default()).unwrap().unwrap();
    assert_eq!(keyword.name(), "keyword");

    let disabled = build_verifier(&VerifierConfig {
        kind: VerifierKind::Disabled,
        ..Default::default()
    })
    .unwrap();
    assert!(disabled.is_none());

    let llm = build_verifier(&VerifierConfig {
        kind: VerifierKind::Llm,
        llm_endpoint: Some("http://localhost:8000".to_string()),
        ..Default::default()
    })
    .unwrap()
    .unwrap();
    assert_eq!(llm.name(), "llm");

    assert!(matches!(
        build_verifier(&VerifierConfig {
            kind: VerifierKind::Llm,
            ..Default::default()
        }),
        Err(VerifierError::InvalidConfig { .. })
    ));
}

#[test]
fn test_select_for_verification_orders_by_tier_then_rank() {
    let candidates = vec![
        candidate(0, 100, 1.0),
        candidate(1, 101, 0.3),
        candidate(2, 102, 0.5),
        candidate(3, 103, 0.9),
        candidate(4, 104, 0.45),
    ];

    let selected: Vec<u64> = select_for_verification(&candidates, 3)
        .iter()
        .map(|c| c.control_id)
        .collect();
    assert_eq!(selected, vec![100, 103, 102]);
}

#[test]
fn test_select_for_verification_bounds() {
    let candidates = vec![candidate(0, 1, 1.0), candidate(1, 2, 0.2)];
    assert!(select_for_verification(&candidates, 0).is_empty());
    assert_eq!(select_for_verification(&candidates, 10).len(), 2);
    assert!(select_for_verification(&[], 5).is_empty());
}

#[tokio::test]
async fn test_assess_with_timeout_passes_through_success() {
    let verifier = MockVerifier::new().with_verdict(5, true, ConfidenceTier::High, "fits");
    let verdict = assess_with_timeout(
        &verifier,
        &request(5, "control", "excerpt"),
        Duration::from_secs(1),
    )
    .await;

    assert!(verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::High);
    assert!(!verdict.degraded);
}

#[tokio::test]
async fn test_assess_with_timeout_degrades_on_timeout() {
    let verifier = KeywordOverlapVerifier::with_latency(Duration::from_secs(5));
    let verdict = assess_with_timeout(
        &verifier,
        &request(5, "control", "excerpt"),
        Duration::from_millis(20),
    )
    .await;

    assert!(verdict.degraded);
    assert!(!verdict.is_applicable);
    assert_eq!(verdict.confidence, ConfidenceTier::Low);
    assert!(verdict.justification.contains("timed out"));
}

#[tokio::test]
async fn test_assess_with_timeout_degrades_on_error() {
    let verifier = MockVerifier::new()
        .with_failure(1, "503 from upstream")
        .with_malformed(2, "not json");

    let failed = assess_with_timeout(
        &verifier,
        &request(1, "control", "excerpt"),
        Duration::from_secs(1),
    )
    .await;
    assert!(failed.degraded);
    assert!(failed.justification.contains("503 from upstream"));

    let malformed = assess_with_timeout(
        &verifier,
        &request(2, "control", "excerpt"),
        Duration::from_secs(1),
    )
    .await;
    assert!(malformed.degraded);
    assert_eq!(malformed.control_id, 2);
    assert_eq!(verifier.calls(), vec![1, 2]);
}

#[tokio::test]
async fn test_keyword_verifier_through_trait_object() {
    let verifier: std::sync::Arc<dyn SemanticVerifier> =
        std::sync::Arc::new(KeywordOverlapVerifier::new());
    let verdict = verifier
        .assess(&request(4, "firewall rules", "firewall rules apply"))
        .await
        .unwrap();
    assert_eq!(verdict.control_id, 4);
    assert_eq!(verdict.confidence, ConfidenceTier::Low);
}

#[test]
fn test_select_for_verification_skips_repeated_ids() {
    let candidates = vec![
        candidate(0, 7, 1.0),
        candidate(3, 7, 0.9),
        candidate(1, 8, 0.5),
        candidate(2, 9, 0.1),
    ];

    let selected: Vec<(usize, u64)> = select_for_verification(&candidates, 3)
        .iter()
        .map(|c| (c.position, c.control_id))
        .collect();
    assert_eq!(selected, vec![(0, 7), (1, 8), (2, 9)]);
}

mod http {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    fn request_complete(buf: &[u8]) -> bool {
        let text = String::from_utf8_lossy(buf);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..header_end]
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.trim().eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        buf.len() >= header_end + 4 + content_length
    }

    /// Answers one request with `status` and `body`; yields the raw request text.
    async fn serve_once(
        status: &'static str,
        body: String,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            while !request_complete(&buf) {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });

        (format!("http://{}", addr), rx)
    }

    fn llm_verifier(endpoint: String) -> LlmVerifier {
        LlmVerifier::new(&VerifierConfig {
            kind: VerifierKind::Llm,
            llm_endpoint: Some(endpoint),
            llm_api_key: Some("test-key".to_string()),
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_llm_assess_parses_successful_response() {
        let body = serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"is_applicable\": true, \"confidence\": \"HIGH\", \"justification\": \"Stores PII.\"}"
                }
            }]
        })
        .to_string();
        let (endpoint, captured) = serve_once("200 OK", body).await;
        let verifier = llm_verifier(endpoint);

        let verdict = verifier
            .assess(&request(11, "Encrypt PII", "We store PII"))
            .await
            .unwrap();
        assert_eq!(verdict.control_id, 11);
        assert!(verdict.is_applicable);
        assert_eq!(verdict.confidence, ConfidenceTier::High);

        let raw = captured.await.unwrap();
        assert!(raw.starts_with("POST /v1/chat/completions "));
        assert!(raw.to_lowercase().contains("authorization: bearer test-key"));
        assert!(raw.contains("llama-3.1-70b-instruct"));
    }

    #[tokio::test]
    async fn test_llm_assess_maps_error_status_to_unavailable() {
        let (endpoint, _captured) =
            serve_once("503 Service Unavailable", "{\"error\":\"overloaded\"}".to_string()).await;
        let verifier = llm_verifier(endpoint);

        let err = verifier
            .assess(&request(11, "Encrypt PII", "We store PII"))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifierError::Unavailable { .. }));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_llm_assess_maps_undecodable_body_to_malformed() {
        let (endpoint, _captured) = serve_once("200 OK", "not json at all".to_string()).await;
        let verifier = llm_verifier(endpoint);

        let err = verifier
            .assess(&request(11, "Encrypt PII", "We store PII"))
            .await
            .unwrap_err();
        assert!(matches!(err, VerifierError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_llm_assess_error_becomes_degraded_verdict() {
        let (endpoint, _captured) = serve_once("500 Internal Server Error", String::new()).await;
        let verifier = llm_verifier(endpoint);

        let verdict = assess_with_timeout(
            &verifier,
            &request(12, "Encrypt PII", "We store PII"),
            Duration::from_secs(5),
        )
        .await;
        assert!(verdict.degraded);
        assert_eq!(verdict.control_id, 12);
        assert!(verdict.justification.contains("500"));
    }
}
