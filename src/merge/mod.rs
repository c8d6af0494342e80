//! Combines lexical candidates and verifier verdicts into one result per control.

pub mod types;


pub use types::{MergedMapping, MergedResult, Provenance};

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::catalog::Catalog;
use crate::constants::LEXICAL_JUSTIFICATION;
use crate::ranking::RankedCandidate;
use crate::verifier::VerifierVerdict;

/// Request-level degradation that must show up in every affected result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeContext {
    /// The document could not be read; every result was ranked without it.
    pub document_unreadable: bool,
    /// Ids that were selected for verification but never got a verdict.
    pub unverified: HashSet<u64>,
}

impl MergeContext {
    pub fn is_clean(&self) -> bool {
        !self.document_unreadable && self.unverified.is_empty()
    }

    fn notes_for(&self, control_id: u64, has_verdict: bool) -> Vec<&'static str> {
        let mut notes = Vec::new();
        if self.document_unreadable {
            notes.push("document unreadable");
        }
        if !has_verdict && self.unverified.contains(&control_id) {
            notes.push("verification cancelled");
        }
        notes
    }
}

/// Merges in lexical order. A candidate with a verdict takes the verifier's
/// judgement (degraded verdicts included); one without keeps its lexical tier.
/// When ids repeat, the first candidate wins.
pub fn merge(
    catalog: &Catalog,
    lexical: &[RankedCandidate],
    verdicts: &[VerifierVerdict],
) -> MergedMapping {
    merge_with_context(catalog, lexical, verdicts, &MergeContext::default())
}

/// [`merge`] that also records request-level degradation. Affected results are marked
/// degraded and carry the reason in their justification, e.g.
/// `"Based on BM25 retrieval score (verification cancelled)"`.
pub fn merge_with_context(
    catalog: &Catalog,
    lexical: &[RankedCandidate],
    verdicts: &[VerifierVerdict],
    context: &MergeContext,
) -> MergedMapping {
    let mut by_id: HashMap<u64, &VerifierVerdict> = HashMap::with_capacity(verdicts.len());
    for verdict in verdicts {
        by_id.entry(verdict.control_id).or_insert(verdict);
    }

    let mut mapping = MergedMapping::new();
    let mut duplicates = 0usize;

    for candidate in lexical {
        let description = catalog
            .description(candidate.position)
            .unwrap_or_default()
            .to_string();

        let verdict = by_id.get(&candidate.control_id);
        let notes = context.notes_for(candidate.control_id, verdict.is_some());

        let mut result = match verdict {
            Some(verdict) => MergedResult {
                control_id: candidate.control_id,
                description,
                final_confidence: verdict.confidence,
                applicable: verdict.is_applicable,
                justification: verdict.justification.clone(),
                provenance: Provenance::VerifierConfirmed,
                lexical_score: candidate.normalized_score,
                degraded: verdict.degraded,
            },
            None => MergedResult {
                control_id: candidate.control_id,
                description,
                final_confidence: candidate.tier,
                applicable: true,
                justification: LEXICAL_JUSTIFICATION.to_string(),
                provenance: Provenance::LexicalOnly,
                lexical_score: candidate.normalized_score,
                degraded: false,
            },
        };

        if !notes.is_empty() {
            result.justification = format!("{} ({})", result.justification, notes.join("; "));
            result.degraded = true;
        }

        if !mapping.insert_first(result) {
            duplicates += 1;
        }
    }

    debug!(
        num_candidates = lexical.len(),
        num_verdicts = verdicts.len(),
        num_merged = mapping.len(),
        duplicates,
        clean = context.is_clean(),
        "Merged lexical and verifier results"
    );

    mapping
}
