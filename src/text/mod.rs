//! Text normalization shared by indexing and query construction.
//!
//! [`TextPreprocessor::normalize`] lower-cases, splits on Unicode word boundaries, keeps
//! purely alphanumeric tokens and drops stop words. It never fails and is deterministic.
//!
//! Words are also split at apostrophes, so `customer's` yields `customer` and `don't`
//! yields the stop words `don` and `t`.

mod stopwords;


pub use stopwords::{ENGLISH_STOP_WORDS, english_stop_words};

use std::collections::HashSet;
use std::sync::Arc;

use unicode_segmentation::UnicodeSegmentation;

/// Ordered sequence of normalized tokens. Scoring treats it as a multiset.
pub type TokenSequence = Vec<String>;

#[derive(Debug, Clone)]
pub struct TextPreprocessor {
    stop_words: Arc<HashSet<&'static str>>,
}

impl Default for TextPreprocessor {
    fn default() -> Self {
        Self::english()
    }
}

impl TextPreprocessor {
    /// Preprocessor backed by the process-wide English stop-word set.
    pub fn english() -> Self {
        Self {
            stop_words: english_stop_words(),
        }
    }

    /// Preprocessor with a caller-supplied stop-word set.
    pub fn with_stop_words<I>(words: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        Self {
            stop_words: Arc::new(words.into_iter().collect()),
        }
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn normalize(&self, text: &str) -> TokenSequence {
        if text.is_empty() {
            return Vec::new();
        }

        let lowered = text.to_lowercase();
        lowered
            .unicode_words()
            .flat_map(|word| word.split(is_apostrophe))
            .filter(|word| !word.is_empty() && word.chars().all(char::is_alphanumeric))
            .filter(|word| !self.stop_words.contains(word))
            .map(str::to_string)
            .collect()
    }
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2019}')
}

/// Returns the first `max_chars` characters of `text` without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
