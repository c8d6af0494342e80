use super::*;

fn composer() -> QueryComposer {
    QueryComposer::default()
}

#[test]
fn test_empty_text_yields_empty_excerpt() {
    assert_eq!(composer().extract_relevant_excerpt(""), "");
}

#[test]
fn test_fallback_prefix_when_no_marker() {
    let text = "Amazon Timestream is a fast, scalable time series database.";
    let excerpt = composer().extract_relevant_excerpt(text);
    assert_eq!(excerpt, text);
}

#[test]
fn test_fallback_prefix_is_bounded() {
    let config = QueryConfig {
        fallback_chars: 10,
        ..Default::default()
    };
    let composer = QueryComposer::new(config, TextPreprocessor::english());
    let excerpt = composer.extract_relevant_excerpt("abcdefghijklmnopqrstuvwxyz");
    assert_eq!(excerpt, "abcdefghij");
}

#[test]
fn test_marker_window_runs_to_line_end_plus_cap() {
    let config = QueryConfig {
        markers: vec![SectionMarker::new("encryption", 5)],
        ..Default::default()
    };
    let composer = QueryComposer::new(config, TextPreprocessor::english());

    let text = "Intro text. Encryption uses AES\nkeys are rotated yearly";
    let excerpt = composer.extract_relevant_excerpt(text);
    assert_eq!(excerpt, "Encryption uses AES\nkeys\n\n");
}

#[test]
fn test_marker_match_is_case_insensitive() {
    let text = "Overview\nSECURITY in the service\nmore";
    let excerpt = composer().extract_relevant_excerpt(text);
    assert!(excerpt.starts_with("SECURITY in the service"));
}

#[test]
fn test_multiple_markers_are_concatenated_in_marker_order() {
    let config = QueryConfig {
        markers: vec![
            SectionMarker::new("security", 0),
            SectionMarker::new("encryption", 0),
        ],
        ..Default::default()
    };
    let composer = QueryComposer::new(config, TextPreprocessor::english());

    let text = "Encryption at rest is on. Security is shared.";
    let excerpt = composer.extract_relevant_excerpt(text);
    assert_eq!(excerpt, "Security is shared\n\nEncryption at rest is on\n\n");
}

#[test]
fn test_matches_of_one_marker_do_not_overlap() {
    let config = QueryConfig {
        markers: vec![SectionMarker::new("security", 100)],
        ..Default::default()
    };
    let composer = QueryComposer::new(config, TextPreprocessor::english());

    let text = "security one. security two. security three.";
    let excerpt = composer.extract_relevant_excerpt(text);
    assert_eq!(excerpt, format!("{}\n\n", text));
}

#[test]
fn test_window_respects_multibyte_characters() {
    let config = QueryConfig {
        markers: vec![SectionMarker::new("encryption", 2)],
        ..Default::default()
    };
    let composer = QueryComposer::new(config, TextPreprocessor::english());

    let excerpt = composer.extract_relevant_excerpt("encryption ünïcode\néé and more");
    assert_eq!(excerpt, "encryption ünïcode\né\n\n");
}

#[test]
fn test_compose_query_includes_all_parts() {
    let query = composer().compose_query("AWS Timestream", "misconfigured VPC rules", "TLS 1.2");
    assert_eq!(query, "AWS Timestream misconfigured VPC rules TLS 1.2");
}

#[test]
fn test_compose_query_truncates_excerpt() {
    let config = QueryConfig {
        query_excerpt_chars: 4,
        ..Default::default()
    };
    let composer = QueryComposer::new(config, TextPreprocessor::english());
    let query = composer.compose_query("svc", "note", "abcdefgh");
    assert_eq!(query, "svc note abcd");
}

#[test]
fn test_compose_tokens_with_empty_excerpt() {
    let tokens = composer().compose_tokens("Cloud Storage", "unauthorized access", "");
    assert_eq!(tokens, vec!["cloud", "storage", "unauthorized", "access"]);
}

#[test]
fn test_query_config_validation() {
    assert!(QueryConfig::default().validate().is_ok());

    let config = QueryConfig {
        markers: vec![SectionMarker::new("  ", 10)],
        ..Default::default()
    };
    assert!(config.validate().is_err());
}
