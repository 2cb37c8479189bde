//! Key-based duplicate detection

use std::collections::HashSet;

use refdup_bibtex::{parse, BibTeXEntry, BibTeXParseError};
use serde::Serialize;

use super::groups::{duplicate_groups, DuplicateGroup};
use crate::config::DetectorConfig;
use crate::error::Result;

/// Parse `document_text` and return every entry whose key was already seen
///
/// Results are in document order. A key occurring N times yields N-1
/// duplicates. Fails only on empty or blank input.
pub fn detect_duplicates(document_text: &str) -> Result<Vec<BibTeXEntry>> {
    DuplicateDetector::default().detect(document_text)
}

/// Return the entries whose key already occurred earlier in `entries`
///
/// Keys are compared by exact string equality. Fields play no role.
pub fn find_duplicate_entries(entries: &[BibTeXEntry]) -> Vec<BibTeXEntry> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(entries.len());
    let mut duplicates = Vec::new();

    for entry in entries {
        if !seen.insert(entry.cite_key.as_str()) {
            duplicates.push(entry.clone());
        }
    }

    duplicates
}

/// Full outcome of checking one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    /// Number of entries recognized in the document
    pub entry_count: usize,
    /// Later occurrences of already-seen keys, in document order
    pub duplicates: Vec<BibTeXEntry>,
    /// Per-key summary of the duplicates
    pub groups: Vec<DuplicateGroup>,
    /// Segments the parser could not read in full
    pub skipped: Vec<BibTeXParseError>,
}

impl DetectionReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}

/// Duplicate detector with logging settings
#[derive(Debug, Clone, Default)]
pub struct DuplicateDetector {
    config: DetectorConfig,
}

impl DuplicateDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Return the duplicate entries of `document_text`
    pub fn detect(&self, document_text: &str) -> Result<Vec<BibTeXEntry>> {
        Ok(self.analyze(document_text)?.duplicates)
    }

    /// Check `document_text` and return the full report
    pub fn analyze(&self, document_text: &str) -> Result<DetectionReport> {
        let parsed = parse(document_text)?;

        if self.config.warn_on_skipped {
            for skipped in &parsed.errors {
                tracing::warn!(line = skipped.line, "{}", skipped.message);
            }
        }

        let duplicates = find_duplicate_entries(&parsed.entries);
        let groups = duplicate_groups(&parsed.entries);

        tracing::debug!(
            entries = parsed.entries.len(),
            duplicates = duplicates.len(),
            skipped = parsed.errors.len(),
            "duplicate check finished"
        );

        Ok(DetectionReport {
            entry_count: parsed.entries.len(),
            duplicates,
            groups,
            skipped: parsed.errors,
        })
    }
}
