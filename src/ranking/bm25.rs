//! Okapi BM25 over tokenized catalog descriptions.

use std::collections::HashMap;

use tracing::debug;

use crate::constants::{DEFAULT_BM25_B, DEFAULT_BM25_K1};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Document-length normalization strength, `0..=1`.
    pub b: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: DEFAULT_BM25_K1,
            b: DEFAULT_BM25_B,
        }
    }
}

impl Bm25Params {
    pub fn new(k1: f32, b: f32) -> Self {
        Self { k1, b }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(format!("k1 must be a non-negative number, got {}", self.k1));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(format!("b must be between 0.0 and 1.0, got {}", self.b));
        }
        Ok(())
    }
}

/// Inverted index built once from tokenized documents.
///
/// Document ids are positions in the input slice. The index is immutable after
/// [`Bm25Index::build`] and safe to share across threads.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    params: Bm25Params,
    /// term -> (document, term frequency)
    postings: HashMap<String, Vec<(usize, u32)>>,
    idf: HashMap<String, f32>,
    doc_lens: Vec<u32>,
    avg_doc_len: f32,
}

impl Bm25Index {
    pub fn build(documents: &[Vec<String>], params: Bm25Params) -> Self {
        let doc_count = documents.len();
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut doc_lens = Vec::with_capacity(doc_count);
        let mut total_len = 0u64;

        for (doc_id, tokens) in documents.iter().enumerate() {
            doc_lens.push(tokens.len() as u32);
            total_len += tokens.len() as u64;

            let mut freqs: HashMap<&str, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token.as_str()).or_insert(0) += 1;
            }
            for (term, tf) in freqs {
                postings
                    .entry(term.to_string())
                    .or_default()
                    .push((doc_id, tf));
            }
        }

        let avg_doc_len = if doc_count == 0 {
            0.0
        } else {
            total_len as f32 / doc_count as f32
        };

        let n = doc_count as f32;
        let idf = postings
            .iter()
            .map(|(term, docs)| {
                let df = docs.len() as f32;
                (term.clone(), (1.0 + (n - df + 0.5) / (df + 0.5)).ln())
            })
            .collect();

        debug!(
            documents = doc_count,
            terms = postings.len(),
            avg_doc_len,
            "Built BM25 index"
        );

        Self {
            params,
            postings,
            idf,
            doc_lens,
            avg_doc_len,
        }
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.postings.len()
    }

    pub fn avg_doc_len(&self) -> f32 {
        self.avg_doc_len
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.idf.get(term).copied()
    }

    /// Scores every document against `query`. Returns one `(position, raw_score)` per
    /// document, in position order. Repeated query terms contribute repeatedly.
    pub fn score(&self, query: &[String]) -> Vec<(usize, f32)> {
        let mut scores = vec![0.0f32; self.doc_lens.len()];
        if scores.is_empty() {
            return Vec::new();
        }

        let Bm25Params { k1, b } = self.params;
        let avg = if self.avg_doc_len > 0.0 {
            self.avg_doc_len
        } else {
            1.0
        };

        for term in query {
            let (Some(docs), Some(&idf)) = (self.postings.get(term), self.idf.get(term)) else {
                continue;
            };

            for &(doc_id, tf) in docs {
                let tf = tf as f32;
                let len_norm = 1.0 - b + b * self.doc_lens[doc_id] as f32 / avg;
                scores[doc_id] += idf * (tf * (k1 + 1.0)) / (tf + k1 * len_norm);
            }
        }

        scores.into_iter().enumerate().collect()
    }
}
