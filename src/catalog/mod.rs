//! In-memory control catalog.
//!
//! Rows are `(id, description, ...)`; only the first two columns matter. Rows whose id
//! does not parse as an integer are skipped rather than rejected, so callers that need
//! strict validation must check the source themselves. Duplicate ids are kept at
//! distinct positions.

pub mod error;


pub use error::CatalogLoadError;

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

/// One control policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlRecord {
    pub id: u64,
    pub description: String,
}

impl ControlRecord {
    pub fn new(id: u64, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// Ordered control records. A record's position is the ranker's document id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    records: Vec<ControlRecord>,
}

impl Catalog {
    pub fn from_records(records: Vec<ControlRecord>) -> Self {
        Self { records }
    }

    /// Loads a catalog from a CSV file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogLoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CatalogLoadError::NotFound {
                path: path.to_path_buf(),
            },
            _ => CatalogLoadError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let catalog = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            controls = catalog.len(),
            "Loaded control catalog"
        );
        Ok(catalog)
    }

    /// Loads a catalog from any CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (row_idx, row) in csv_reader.records().enumerate() {
            let row = match row {
                Ok(row) => row,
                Err(e) if is_fatal_csv_error(&e) => {
                    return Err(CatalogLoadError::Csv { source: e });
                }
                Err(e) => {
                    debug!(row = row_idx + 1, error = %e, "Skipping undecodable catalog row");
                    skipped += 1;
                    continue;
                }
            };

            match parse_row(&row) {
                Some(record) => records.push(record),
                None => {
                    debug!(row = row_idx + 1, "Skipping malformed catalog row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            info!(skipped, kept = records.len(), "Skipped malformed catalog rows");
        }

        Ok(Self { records })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ControlRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&ControlRecord> {
        self.records.get(position)
    }

    pub fn description(&self, position: usize) -> Option<&str> {
        self.records.get(position).map(|r| r.description.as_str())
    }

    /// First record carrying `control_id`.
    pub fn find(&self, control_id: u64) -> Option<&ControlRecord> {
        self.records.iter().find(|r| r.id == control_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlRecord> {
        self.records.iter()
    }

    /// Content hash of the catalog in position order, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for record in &self.records {
            hasher.update(&record.id.to_le_bytes());
            hasher.update(record.description.as_bytes());
            hasher.update(b"\x1e");
        }
        hasher.finalize().to_hex().to_string()
    }
}

fn parse_row(row: &csv::StringRecord) -> Option<ControlRecord> {
    if row.len() < 2 {
        return None;
    }

    let id: u64 = row.get(0)?.trim().parse().ok()?;
    let description = row.get(1)?.trim();
    if description.is_empty() {
        return None;
    }

    Some(ControlRecord::new(id, description))
}

fn is_fatal_csv_error(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(_))
}
