//! Query composition from service documentation.
//!
//! The excerpt is built from bounded windows that start at security-relevant markers.
//! Each window runs to the end of the marker's line or sentence, then continues for at
//! most the marker's cap. Matches for the same marker never overlap. Without any marker
//! the excerpt falls back to a prefix of the raw text.

#[cfg(test)]
mod tests;

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::constants::{FALLBACK_EXCERPT_CHARS, QUERY_EXCERPT_CHARS};
use crate::text::{TextPreprocessor, TokenSequence, truncate_chars};

/// A section marker and the number of characters captured after its line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionMarker {
    pub keyword: String,
    pub window_chars: usize,
}

impl SectionMarker {
    pub fn new(keyword: impl Into<String>, window_chars: usize) -> Self {
        Self {
            keyword: keyword.into(),
            window_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    pub markers: Vec<SectionMarker>,
    pub fallback_chars: usize,
    pub query_excerpt_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                SectionMarker::new("security", 5000),
                SectionMarker::new("compliance", 3000),
                SectionMarker::new("data protection", 3000),
                SectionMarker::new("authentication", 2000),
                SectionMarker::new("authorization", 2000),
                SectionMarker::new("encryption", 2000),
            ],
            fallback_chars: FALLBACK_EXCERPT_CHARS,
            query_excerpt_chars: QUERY_EXCERPT_CHARS,
        }
    }
}

impl QueryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(marker) = self.markers.iter().find(|m| m.keyword.trim().is_empty()) {
            return Err(format!(
                "section marker keyword cannot be empty (window {})",
                marker.window_chars
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct CompiledMarker {
    pattern: Regex,
    window_chars: usize,
}

#[derive(Debug, Clone)]
pub struct QueryComposer {
    config: QueryConfig,
    markers: Vec<CompiledMarker>,
    preprocessor: TextPreprocessor,
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self::new(QueryConfig::default(), TextPreprocessor::english())
    }
}

impl QueryComposer {
    pub fn new(config: QueryConfig, preprocessor: TextPreprocessor) -> Self {
        let markers = config
            .markers
            .iter()
            .filter(|marker| !marker.keyword.trim().is_empty())
            .filter_map(|marker| {
                RegexBuilder::new(&regex::escape(marker.keyword.trim()))
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|pattern| CompiledMarker {
                        pattern,
                        window_chars: marker.window_chars,
                    })
            })
            .collect();

        Self {
            config,
            markers,
            preprocessor,
        }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Concatenates every marker window (each followed by a blank line), or falls back to
    /// a prefix of `raw` when nothing matches. Empty input yields an empty excerpt.
    pub fn extract_relevant_excerpt(&self, raw: &str) -> String {
        if raw.is_empty() {
            return String::new();
        }

        let mut excerpt = String::new();
        let mut windows = 0usize;

        for marker in &self.markers {
            let mut search_from = 0usize;
            while search_from < raw.len() {
                let Some(found) = marker.pattern.find_at(raw, search_from) else {
                    break;
                };
                let end = window_end(raw, found.end(), marker.window_chars);

                excerpt.push_str(&raw[found.start()..end]);
                excerpt.push_str("\n\n");
                windows += 1;

                search_from = end.max(found.end());
            }
        }

        if windows == 0 {
            debug!(
                raw_len = raw.len(),
                fallback_chars = self.config.fallback_chars,
                "No security markers found, using document prefix"
            );
            return truncate_chars(raw, self.config.fallback_chars).to_string();
        }

        debug!(
            windows,
            excerpt_len = excerpt.len(),
            "Extracted security-relevant excerpt"
        );
        excerpt
    }

    /// `"{service} {note} {excerpt prefix}"`.
    pub fn compose_query(&self, service_name: &str, analyst_note: &str, excerpt: &str) -> String {
        format!(
            "{} {} {}",
            service_name,
            analyst_note,
            truncate_chars(excerpt, self.config.query_excerpt_chars)
        )
    }

    /// [`compose_query`](Self::compose_query) passed through the preprocessor.
    pub fn compose_tokens(
        &self,
        service_name: &str,
        analyst_note: &str,
        excerpt: &str,
    ) -> TokenSequence {
        self.preprocessor
            .normalize(&self.compose_query(service_name, analyst_note, excerpt))
    }
}

/// Byte offset where a window that starts matching at `from` ends: the rest of the
/// line or sentence, then up to `window_chars` more characters.
fn window_end(raw: &str, from: usize, window_chars: usize) -> usize {
    let tail = &raw[from..];
    let line_end = tail
        .find(['\n', '.'])
        .map(|offset| from + offset)
        .unwrap_or(raw.len());

    let rest = &raw[line_end..];
    line_end + truncate_chars(rest, window_chars).len()
}
