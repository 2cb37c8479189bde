//! refdup-core: duplicate cite-key detection for bibliography files
//!
//! Parses BibTeX-like text and reports every entry whose cite key already
//! appeared earlier in the document. Matching is by exact key equality only;
//! DOIs and other fields are parsed but never consulted.
//!
//! ```
//! let text = "@article{A,\n}\n@book{B,\n}\n@misc{A,\n}\n";
//! let duplicates = refdup_core::detect_duplicates(text).unwrap();
//! assert_eq!(duplicates.len(), 1);
//! assert_eq!(duplicates[0].cite_key, "A");
//! assert_eq!(duplicates[0].position, 2);
//! ```

pub mod config;
pub mod deduplication;
pub mod error;

pub use config::{DetectorConfig, RefdupConfig, ReportConfig, ReportFormat};
pub use deduplication::{
    detect_duplicates, duplicate_groups, find_duplicate_entries, DetectionReport,
    DuplicateDetector, DuplicateGroup,
};
pub use error::{ConfigError, DetectError, Result};

/// Entry types re-exported from the parser crate
pub mod bibtex {
    pub use refdup_bibtex::{
        format_entries, format_entry, parse, BibTeXEntry, BibTeXEntryType, BibTeXField,
        BibTeXParseError, BibTeXParseResult, ParseError,
    };
}
