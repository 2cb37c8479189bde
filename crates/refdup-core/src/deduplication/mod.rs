//! Duplicate cite-key detection
//!
//! An entry is a duplicate when its key already appeared earlier in the
//! document. Only the 2nd and later occurrences are reported.

mod detector;
mod groups;

pub use detector::{detect_duplicates, find_duplicate_entries, DetectionReport, DuplicateDetector};
pub use groups::{duplicate_groups, DuplicateGroup};
