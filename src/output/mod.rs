//! Report assembly, JSON views and the human-readable summary.

pub mod error;


pub use error::OutputError;

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::constants::SUMMARY_TOP_MATCHES;
use crate::merge::{MergedMapping, Provenance};
use crate::ranking::ConfidenceTier;

/// `service_name -> control_id -> entry`.
pub type DetailedView = BTreeMap<String, BTreeMap<String, DetailedEntry>>;

/// `service_name -> control_id -> confidence`, applicable controls only.
pub type SimpleView = BTreeMap<String, BTreeMap<String, ConfidenceTier>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedEntry {
    pub confidence: ConfidenceTier,
    pub applicable: bool,
    pub description: String,
    pub justification: String,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub catalog_size: usize,
    pub lexical_matches: usize,
    pub verified: usize,
    pub degraded: usize,
    pub applicable: usize,
}

impl MappingStats {
    pub fn from_mapping(catalog_size: usize, mapping: &MergedMapping) -> Self {
        Self {
            catalog_size,
            lexical_matches: mapping.len(),
            verified: mapping.count_by(Provenance::VerifierConfirmed),
            degraded: mapping.degraded_count(),
            applicable: mapping.applicable_count(),
        }
    }
}

/// Result of one mapping request.
#[derive(Debug, Clone, Serialize)]
pub struct MappingReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub service_name: String,
    /// blake3 fingerprint of the catalog the request ran against.
    pub catalog_fingerprint: String,
    pub stats: MappingStats,
    /// Degraded inputs (unreadable document, cancelled verification).
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub mapping: MergedMapping,
}

impl MappingReport {
    pub fn new(
        service_name: impl Into<String>,
        catalog_size: usize,
        catalog_fingerprint: impl Into<String>,
        mapping: MergedMapping,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            service_name: service_name.into(),
            catalog_fingerprint: catalog_fingerprint.into(),
            stats: MappingStats::from_mapping(catalog_size, &mapping),
            warnings,
            mapping,
        }
    }

    pub fn detailed(&self) -> DetailedView {
        let entries = self
            .mapping
            .values()
            .map(|r| {
                (
                    r.control_id.to_string(),
                    DetailedEntry {
                        confidence: r.final_confidence,
                        applicable: r.applicable,
                        description: r.description.clone(),
                        justification: r.justification.clone(),
                        provenance: r.provenance,
                    },
                )
            })
            .collect();

        BTreeMap::from([(self.service_name.clone(), entries)])
    }

    pub fn simple(&self) -> SimpleView {
        let entries = self
            .mapping
            .simple_view()
            .into_iter()
            .map(|(id, tier)| (id.to_string(), tier))
            .collect();

        BTreeMap::from([(self.service_name.clone(), entries)])
    }
}

impl fmt::Display for MappingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(80);
        writeln!(f, "CONTROL MAPPING SUMMARY:")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Cloud Service: {}", self.service_name)?;
        writeln!(f, "Total controls analyzed: {}", self.stats.catalog_size)?;
        writeln!(f, "Controls matched lexically: {}", self.stats.lexical_matches)?;
        writeln!(f, "Controls verified: {}", self.stats.verified)?;
        writeln!(f, "Degraded results: {}", self.stats.degraded)?;
        writeln!(f, "Final applicable controls: {}", self.stats.applicable)?;
        for warning in &self.warnings {
            writeln!(f, "Warning: {}", warning)?;
        }
        writeln!(f, "{}", rule)?;
        writeln!(f)?;
        write!(f, "TOP CONTROL MATCHES:")?;

        for result in self.mapping.ordered().into_iter().take(SUMMARY_TOP_MATCHES) {
            writeln!(f)?;
            writeln!(f)?;
            writeln!(f, "Control {}: {}", result.control_id, result.description)?;
            writeln!(
                f,
                "  Confidence: {}",
                result.final_confidence.as_str().to_uppercase()
            )?;
            writeln!(f, "  Provenance: {}", result.provenance)?;
            write!(f, "  Justification: {}", result.justification)?;
        }
        writeln!(f)
    }
}

/// Writes `value` as pretty JSON, creating parent directories first.
pub fn write_json(path: impl AsRef<Path>, value: &impl Serialize) -> Result<(), OutputError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| OutputError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json).map_err(|e| OutputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!(path = %path.display(), "Wrote mapping results");
    Ok(())
}
