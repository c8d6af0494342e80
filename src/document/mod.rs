//! Document-to-text collaborators.
//!
//! The pipeline only needs raw text. PDF extraction happens outside this crate; a
//! [`TextFile`] holds text that was already extracted, with pages separated by form
//! feeds (`\x0c`) as common extractors emit them.

pub mod error;


pub use error::DocumentReadError;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

pub const PAGE_SEPARATOR: char = '\x0c';

#[async_trait]
/// Source of raw documentation text.
pub trait DocumentSource: Send + Sync {
    async fn read_text(&self) -> Result<String, DocumentReadError>;
}

/// 1-indexed, inclusive page range. Open ends extend to the first/last page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl PageRange {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Keeps the selected pages, clamping the range to the pages present.
    pub fn apply(&self, text: &str) -> String {
        if self.is_unbounded() {
            return text.to_string();
        }

        let pages: Vec<&str> = text.split(PAGE_SEPARATOR).collect();
        let last = pages.len() - 1;

        let start_idx = self.start.unwrap_or(1).saturating_sub(1).min(last);
        let end_idx = self
            .end
            .unwrap_or(pages.len())
            .saturating_sub(1)
            .min(last)
            .max(start_idx);

        debug!(
            start = start_idx + 1,
            end = end_idx + 1,
            total_pages = pages.len(),
            "Selecting document pages"
        );

        pages[start_idx..=end_idx].join(&PAGE_SEPARATOR.to_string())
    }
}

/// Pre-extracted document text on disk. Invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Clone)]
pub struct TextFile {
    path: PathBuf,
    pages: PageRange,
}

impl TextFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pages: PageRange::default(),
        }
    }

    pub fn with_pages(mut self, pages: PageRange) -> Self {
        self.pages = pages;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentSource for TextFile {
    async fn read_text(&self) -> Result<String, DocumentReadError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => DocumentReadError::NotFound {
                path: self.path.clone(),
            },
            _ => DocumentReadError::Io {
                path: self.path.clone(),
                source: e,
            },
        })?;

        let text = String::from_utf8_lossy(&bytes);
        Ok(self.pages.apply(&text))
    }
}

/// Text already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InlineText {
    text: String,
}

impl InlineText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl DocumentSource for InlineText {
    async fn read_text(&self) -> Result<String, DocumentReadError> {
        Ok(self.text.clone())
    }
}
