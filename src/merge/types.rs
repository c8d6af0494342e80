use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ranking::ConfidenceTier;

/// Which stage produced the final confidence of a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    LexicalOnly,
    VerifierConfirmed,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::LexicalOnly => "lexical-only",
            Provenance::VerifierConfirmed => "verifier-confirmed",
        }
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    pub control_id: u64,
    pub description: String,
    pub final_confidence: ConfidenceTier,
    pub applicable: bool,
    pub justification: String,
    pub provenance: Provenance,
    /// Normalized lexical score the candidate was selected with.
    pub lexical_score: f32,
    #[serde(default)]
    pub degraded: bool,
}

/// Merged results for one service, keyed by control id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedMapping {
    results: BTreeMap<u64, MergedResult>,
}

impl MergedMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts unless the id is already present. Returns whether it was inserted.
    pub(crate) fn insert_first(&mut self, result: MergedResult) -> bool {
        match self.results.entry(result.control_id) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(result);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, control_id: u64) -> Option<&MergedResult> {
        self.results.get(&control_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u64, &MergedResult)> {
        self.results.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &MergedResult> {
        self.results.values()
    }

    /// Display order: tier rank ascending, then control id ascending.
    pub fn ordered(&self) -> Vec<&MergedResult> {
        let mut ordered: Vec<&MergedResult> = self.results.values().collect();
        ordered.sort_by_key(|r| (r.final_confidence.rank(), r.control_id));
        ordered
    }

    /// `control_id -> confidence` for applicable results only.
    pub fn simple_view(&self) -> BTreeMap<u64, ConfidenceTier> {
        self.results
            .values()
            .filter(|r| r.applicable)
            .map(|r| (r.control_id, r.final_confidence))
            .collect()
    }

    pub fn count_by(&self, provenance: Provenance) -> usize {
        self.results
            .values()
            .filter(|r| r.provenance == provenance)
            .count()
    }

    pub fn degraded_count(&self) -> usize {
        self.results.values().filter(|r| r.degraded).count()
    }

    pub fn applicable_count(&self) -> usize {
        self.results.values().filter(|r| r.applicable).count()
    }
}
