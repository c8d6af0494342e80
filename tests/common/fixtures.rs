//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const SERVICE_NAME: &str = "Acme Object Storage";

pub const ANALYST_NOTE: &str = "Service will store customer PII and payment data";

/// Three pages separated by form feeds; only page 2 talks about security.
pub const PAGED_DOCUMENT: &str = "Acme Object Storage overview\nPricing and regions.\x0c\
Security\nAll objects are encrypted at rest with AES-256 and customer managed keys.\n\
Authentication uses multi-factor tokens for administrators.\n\x0c\
Appendix\nRelease notes and changelog.";

#[derive(Default)]
pub struct CatalogBuilder {
    rows: Vec<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self) -> Self {
        self.rows.push("id,description".to_string());
        self
    }

    pub fn control(mut self, id: u64, description: &str) -> Self {
        self.rows.push(format!("{},\"{}\"", id, description.replace('"', "\"\"")));
        self
    }

    pub fn raw_row(mut self, row: &str) -> Self {
        self.rows.push(row.to_string());
        self
    }

    /// Controls covering encryption, authentication, logging and networking.
    pub fn standard() -> Self {
        Self::new()
            .header()
            .control(101, "Encrypt customer data at rest using managed encryption keys")
            .control(102, "Enforce multi-factor authentication for administrators")
            .control(103, "Retain audit logs of administrative access for one year")
            .control(104, "Restrict inbound network traffic with firewall rules")
            .control(105, "Protect payment card data in line with PCI requirements")
    }

    pub fn to_csv(&self) -> String {
        let mut csv = self.rows.join("\n");
        csv.push('\n');
        csv
    }

    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let path = dir.join("controls.csv");
        std::fs::write(&path, self.to_csv()).expect("write catalog fixture");
        path
    }
}

pub fn write_document(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("document.txt");
    std::fs::write(&path, contents).expect("write document fixture");
    path
}
