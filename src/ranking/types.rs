use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{HIGH_CONFIDENCE_THRESHOLD, MEDIUM_CONFIDENCE_THRESHOLD};

/// Three-level confidence label. Declaration order is display order (high first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Maps a normalized score to a tier. Both thresholds are exclusive lower bounds.
    pub fn from_score(score: f32) -> Self {
        if score > HIGH_CONFIDENCE_THRESHOLD {
            ConfidenceTier::High
        } else if score > MEDIUM_CONFIDENCE_THRESHOLD {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    /// Sort rank: high = 0, medium = 1, low = 2.
    pub fn rank(self) -> u8 {
        match self {
            ConfidenceTier::High => 0,
            ConfidenceTier::Medium => 1,
            ConfidenceTier::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceTier::High => "high",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(ConfidenceTier::High),
            "medium" => Ok(ConfidenceTier::Medium),
            "low" => Ok(ConfidenceTier::Low),
            _ => Err(format!("unknown confidence level: {}", s)),
        }
    }
}

/// One control selected by the lexical stage.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate {
    /// Catalog position (internal document id).
    pub position: usize,
    pub control_id: u64,
    pub raw_score: f32,
    /// Raw score divided by the batch maximum, in `[0, 1]`.
    pub normalized_score: f32,
    pub tier: ConfidenceTier,
}
