//! BibTeX entry parsing
//!
//! This crate turns bibliography text into an ordered list of entries.
//! It is deliberately tolerant: segments that do not parse are skipped and
//! reported in [`BibTeXParseResult::errors`] instead of failing the whole
//! document. Only empty input is an error.
//!
//! Features:
//! - Nom-based entry header and field parsing
//! - Braced, quoted, numeric and `@string` field values
//! - `@string`, `@preamble` and `@comment` blocks
//! - Re-emitting entries as BibTeX

mod entry;
mod formatter;
pub mod parser;

pub use entry::{BibTeXEntry, BibTeXEntryType, BibTeXField};
pub use formatter::{format_entries, format_entry};
pub use parser::{parse, parse_entry, BibTeXParseError, BibTeXParseResult, ParseError};
