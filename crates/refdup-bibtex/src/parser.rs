//! BibTeX parser implementation using nom
//!
//! The parser splits a document into `@`-prefixed segments and handles:
//! - @string definitions
//! - @preamble declarations
//! - @comment sections
//! - All entry types (unknown types are kept as `Unknown`)
//! - Braced, quoted, numeric and macro field values
//! - String concatenation with #
//! - Nested braces in field values
//!
//! A segment whose header (`@type{key`) does not parse is recorded in
//! `errors` and skipped; scanning resumes at the next `@`. Once the key has
//! been read the entry is always kept: if its fields are malformed, the entry
//! keeps the fields that did parse, the problem is recorded in `errors`, and
//! scanning resumes after the entry's closing brace.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    IResult,
};
use serde::Serialize;
use std::collections::HashMap;

use super::entry::{BibTeXEntry, BibTeXEntryType};

/// A segment that could not be read in full
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BibTeXParseError {
    /// 1-based line on which the segment starts
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Result of parsing a BibTeX document
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BibTeXParseResult {
    pub entries: Vec<BibTeXEntry>,
    pub preambles: Vec<String>,
    pub strings: HashMap<String, String>,
    pub errors: Vec<BibTeXParseError>,
}

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty input: nothing to parse")]
    EmptyInput,
    #[error("Invalid syntax")]
    InvalidSyntax,
}

/// Parse a BibTeX document
///
/// Fails only when `input` is empty or whitespace. Malformed segments end up
/// in [`BibTeXParseResult::errors`]. Only brace-delimited entries are
/// recognized; `@article(key, ...)` segments are recorded there as well.
pub fn parse(input: &str) -> Result<BibTeXParseResult, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    Ok(parse_bibtex(input))
}

/// Parse the first BibTeX entry in `input`
pub fn parse_entry(input: &str) -> Result<BibTeXEntry, ParseError> {
    let result = parse(input)?;
    result
        .entries
        .into_iter()
        .next()
        .ok_or(ParseError::InvalidSyntax)
}

/// Internal parsing function
fn parse_bibtex(input: &str) -> BibTeXParseResult {
    let mut result = BibTeXParseResult::default();
    let mut remaining = input;

    while !remaining.is_empty() {
        remaining = skip_whitespace_and_comments(remaining);

        if remaining.is_empty() {
            break;
        }

        if !remaining.starts_with('@') {
            // Free text between entries is ignored
            match remaining.find('@') {
                Some(pos) => {
                    remaining = &remaining[pos..];
                    continue;
                }
                None => break,
            }
        }

        match parse_at_entry(remaining, &result.strings) {
            Ok((rest, at_entry)) => {
                match at_entry {
                    AtEntry::Entry(mut entry, complete) => {
                        if !complete {
                            let line = line_of(input, remaining);
                            tracing::debug!(line, key = %entry.cite_key, "malformed fields");
                            result.errors.push(BibTeXParseError {
                                line,
                                column: 1,
                                message: format!("Malformed fields in entry {}", entry.cite_key),
                            });
                        }
                        let consumed = &remaining[..remaining.len() - rest.len()];
                        entry.raw_bibtex = Some(consumed.trim().to_string());
                        entry.position = result.entries.len();
                        result.entries.push(entry);
                    }
                    AtEntry::String(key, value) => {
                        result.strings.insert(key, value);
                    }
                    AtEntry::Preamble(text) => {
                        result.preambles.push(text);
                    }
                    AtEntry::Comment => {}
                }
                remaining = rest;
            }
            Err(_) => {
                let line = line_of(input, remaining);
                tracing::debug!(line, "skipping unparseable segment");
                result.errors.push(BibTeXParseError {
                    line,
                    column: 1,
                    message: "Failed to parse entry".to_string(),
                });
                match remaining[1..].find('@') {
                    Some(pos) => remaining = &remaining[pos + 1..],
                    None => break,
                }
            }
        }
    }

    result
}

/// 1-based line number of `rest` within `input`
fn line_of(input: &str, rest: &str) -> u32 {
    let offset = input.len() - rest.len();
    input[..offset].matches('\n').count() as u32 + 1
}

/// Result of parsing an @ segment
enum AtEntry {
    /// An entry, and whether its fields parsed cleanly
    Entry(BibTeXEntry, bool),
    String(String, String),
    Preamble(String),
    Comment,
}

/// Skip whitespace and `%` line comments
fn skip_whitespace_and_comments(input: &str) -> &str {
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
        } else if bytes[pos] == b'%' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
        } else {
            break;
        }
    }

    &input[pos..]
}

/// Characters allowed in a cite key
///
/// Anything up to whitespace, a comma or a brace belongs to the key.
fn is_key_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '{' | '}')
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.' | '+')
}

/// Parse an @ segment (entry, string, preamble, or comment)
fn parse_at_entry<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtEntry> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, entry_type) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match entry_type.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtEntry::String(key, value)))
        }
        "preamble" => {
            let (rest, text) = parse_preamble(rest, strings)?;
            Ok((rest, AtEntry::Preamble(text)))
        }
        "comment" => {
            let (rest, _) = parse_comment_body(rest)?;
            Ok((rest, AtEntry::Comment))
        }
        _ => parse_entry_body(rest, entry_type, strings),
    }
}

/// Parse a @string definition
fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, (key, value)) = parse_single_field(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, (key, value)))
}

/// Parse a @preamble
fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    Ok((rest, value))
}

/// Parse a @comment body (braced block, or the rest of the line)
fn parse_comment_body(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, _) = parse_braced_content(rest)?;
        Ok((rest, ()))
    } else {
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], ()))
    }
}

/// Parse an entry body: `{key, name = value, ...}`
///
/// Fails only if the header up to the key does not parse. Malformed fields
/// yield an incomplete entry that ends at its closing brace.
fn parse_entry_body<'a>(
    input: &'a str,
    entry_type: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtEntry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;

    let (rest, cite_key) = take_while1(is_key_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    // A key-only entry such as `@misc{A}` has no comma
    let (rest, _) = opt(char(','))(rest)?;

    let (rest, fields) = parse_fields(rest, strings)?;

    let mut entry = BibTeXEntry::new(cite_key.to_string(), BibTeXEntryType::from_str(entry_type));
    for (key, value) in fields {
        entry.add_field(key, value);
    }

    let (after_space, _) = multispace0(rest)?;
    match after_space.strip_prefix('}') {
        Some(rest) => Ok((rest, AtEntry::Entry(entry, true))),
        None => Ok((skip_to_entry_end(rest), AtEntry::Entry(entry, false))),
    }
}

/// Skip the remainder of an entry whose fields did not parse
///
/// Stops after the brace that closes the entry, or before an `@` that starts
/// a line, whichever comes first.
fn skip_to_entry_end(input: &str) -> &str {
    let mut depth = 1usize;
    let mut line_start = false;

    for (pos, b) in input.bytes().enumerate() {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return &input[pos + 1..];
                }
            }
            b'@' if line_start => return &input[pos..],
            _ => {}
        }
        if b == b'\n' {
            line_start = true;
        } else if !b.is_ascii_whitespace() {
            line_start = false;
        }
    }

    &input[input.len()..]
}

/// Parse fields within an entry
fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        match parse_single_field(rest, strings) {
            Ok((rest, field)) => {
                // A field ends at a comma or at the closing brace
                let (rest, _) = multispace0(rest)?;
                if let Some(stripped) = rest.strip_prefix(',') {
                    remaining = stripped;
                } else if rest.starts_with('}') {
                    remaining = rest;
                } else {
                    return Ok((remaining, fields));
                }
                fields.push(field);
            }
            Err(_) => {
                return Ok((remaining, fields));
            }
        }
    }
}

/// Parse a single field (name = value)
fn parse_single_field<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, _) = multispace0(input)?;
    let (rest, key) = take_while1(is_name_char)(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('=')(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;

    Ok((rest, (key.to_string(), value)))
}

/// Parse a field value (braced, quoted, number, or string reference)
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(take_while1(is_name_char), |s: &str| {
                strings.get(s).cloned().unwrap_or_else(|| s.to_string())
            }),
        ))(rest)?;

        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        match rest.strip_prefix('#') {
            Some(stripped) => remaining = stripped,
            None => return Ok((rest, result)),
        }
    }
}

/// Parse a braced value {content}
fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = parse_braced_content(input)?;
    let inner = &content[1..content.len() - 1];
    Ok((rest, inner.to_string()))
}

/// Parse braced content including nested braces
///
/// Backslashes do not escape braces, so `{C:\}` is a complete value.
fn parse_braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom_error(input));
    }

    let mut depth = 0usize;
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        match bytes[pos] {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[pos + 1..], &input[..pos + 1]));
                }
            }
            _ => {}
        }
        pos += 1;
    }

    Err(nom_error(input))
}

/// Parse a quoted value "content"
///
/// Quotes inside braces and escaped quotes do not terminate the value.
fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom_error(input));
    }

    let bytes = input.as_bytes();
    let mut pos = 1;
    let mut brace_depth = 0usize;

    while pos < bytes.len() {
        match bytes[pos] {
            b'"' if brace_depth == 0 => {
                return Ok((&input[pos + 1..], input[1..pos].to_string()));
            }
            b'{' => brace_depth += 1,
            b'}' => brace_depth = brace_depth.saturating_sub(1),
            b'\\' => pos += 1,
            _ => {}
        }
        pos += 1;
    }

    Err(nom_error(input))
}

fn nom_error(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_simple_entry() {
        let input = r#"
@article{Smith2024,
    author = {John Smith},
    title = {A Great Paper},
    year = {2024},
    doi = {10.1038/nature12373},
}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries.len(), 1);
        assert!(result.errors.is_empty());

        let entry = &result.entries[0];
        assert_eq!(entry.cite_key, "Smith2024");
        assert_eq!(entry.entry_type, BibTeXEntryType::Article);
        assert_eq!(entry.get_field("title"), Some("A Great Paper"));
        assert_eq!(entry.doi(), Some("10.1038/nature12373"));
        assert_eq!(entry.position, 0);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\n\t\n")]
    fn test_empty_or_blank_input_is_rejected(#[case] input: &str) {
        assert_eq!(parse(input), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_text_without_entries_yields_nothing() {
        let result = parse("just some prose, no entries here").unwrap();
        assert!(result.entries.is_empty());
        assert!(result.errors.is_empty());
    }

    #[rstest]
    #[case("@article{Smith:2024+x,\n}", "Smith:2024+x")]
    #[case("@article{ smith2024 ,\n}", "smith2024")]
    #[case("@misc{A}", "A")]
    #[case("@Book{Knuth.TAOCP/1,}", "Knuth.TAOCP/1")]
    fn test_key_taken_as_written(#[case] input: &str, #[case] expected: &str) {
        let entry = parse_entry(input).unwrap();
        assert_eq!(entry.cite_key, expected);
    }

    #[test]
    fn test_keys_keep_case() {
        let result = parse("@misc{Key,}\n@misc{key,}").unwrap();
        let keys: Vec<_> = result.entries.iter().map(|e| e.cite_key.as_str()).collect();
        assert_eq!(keys, vec!["Key", "key"]);
    }

    #[test]
    fn test_parse_quoted_values() {
        let input = r#"
@article{Test2024,
    author = "Jane Doe",
    title = "Testing \"Quotes\" and {"braced"} text",
}
"#;
        let entry = parse_entry(input).unwrap();
        assert_eq!(entry.get_field("author"), Some("Jane Doe"));
        assert_eq!(
            entry.get_field("title"),
            Some(r#"Testing \"Quotes\" and {"braced"} text"#)
        );
    }

    #[test]
    fn test_parse_quoted_value_keeps_unicode() {
        let entry = parse_entry("@article{A, author = \"Gödel, Kurt\"}").unwrap();
        assert_eq!(entry.get_field("author"), Some("Gödel, Kurt"));
    }

    #[test]
    fn test_parse_nested_braces() {
        let input = "@article{Test2024,\n    title = {A {B}ook about {LaTeX}},\n}";
        let entry = parse_entry(input).unwrap();
        assert_eq!(entry.get_field("title"), Some("A {B}ook about {LaTeX}"));
    }

    #[test]
    fn test_parse_string_definitions_and_concatenation() {
        let input = r#"
@string{nat = "Nature"}
@article{Test2024,
    journal = nat # " Physics",
    year = 2024,
}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.strings.get("nat"), Some(&"Nature".to_string()));
        assert_eq!(result.entries.len(), 1);
        assert_eq!(
            result.entries[0].get_field("journal"),
            Some("Nature Physics")
        );
        assert_eq!(result.entries[0].get_field("year"), Some("2024"));
    }

    #[test]
    fn test_preamble_and_comment_do_not_produce_entries() {
        let input = r#"
% a line comment mentioning nothing
@preamble{"\newcommand{\noop}[1]{}"}
@comment{ @article{Hidden, } }
@article{Visible,}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.preambles.len(), 1);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "Visible");
    }

    #[test]
    fn test_parse_multiple_entries_in_order() {
        let input = r#"
@article{First2024,
    title = {First Paper},
}

@book{Second2024,
    title = {Second Book},
}
"#;
        let result = parse(input).unwrap();
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].cite_key, "First2024");
        assert_eq!(result.entries[1].cite_key, "Second2024");
        assert_eq!(result.entries[1].position, 1);
        assert_eq!(result.entries[1].entry_type, BibTeXEntryType::Book);
    }

    #[test]
    fn test_malformed_segment_is_skipped_and_recorded() {
        let input = "@article{Good1,}\n@article{,\n title = {no key}}\n@article{Good2,}\n";
        let result = parse(input).unwrap();

        let keys: Vec<_> = result.entries.iter().map(|e| e.cite_key.as_str()).collect();
        assert_eq!(keys, vec!["Good1", "Good2"]);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 2);
    }

    #[test]
    fn test_unterminated_entry_keeps_key() {
        let result = parse("@article{Open,\n title = {never closed").unwrap();
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].cite_key, "Open");
        assert!(result.entries[0].fields.is_empty());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_malformed_field_keeps_entry_and_earlier_fields() {
        let input = "@misc{A, title = {T}, doi = 10.1/x, year = 2020}\n@misc{B}\n";
        let result = parse(input).unwrap();

        let keys: Vec<_> = result.entries.iter().map(|e| e.cite_key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(result.entries[0].get_field("title"), Some("T"));
        assert_eq!(result.entries[0].doi(), None);
        assert_eq!(
            result.entries[0].raw_bibtex.as_deref(),
            Some("@misc{A, title = {T}, doi = 10.1/x, year = 2020}")
        );
        assert_eq!(result.entries[1].position, 1);

        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 1);
        assert_eq!(result.errors[0].message, "Malformed fields in entry A");
    }

    #[test]
    fn test_recovery_stops_at_next_entry() {
        let result = parse("@misc{A, note = {open\n@misc{B}\n").unwrap();

        let keys: Vec<_> = result.entries.iter().map(|e| e.cite_key.as_str()).collect();
        assert_eq!(keys, vec!["A", "B"]);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_backslash_does_not_escape_braces() {
        let result = parse("@misc{A, note = {C:\\}}\n@misc{B}\n").unwrap();

        assert!(result.errors.is_empty());
        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries[0].get_field("note"), Some("C:\\"));
    }

    #[rstest]
    #[case("some:field")]
    #[case("date-added")]
    #[case("bdsk.url+1")]
    fn test_field_names_with_punctuation(#[case] name: &str) {
        let input = format!("@misc{{A, {} = {{y}}}}", name);
        let result = parse(&input).unwrap();

        assert!(result.errors.is_empty());
        assert_eq!(result.entries[0].get_field(name), Some("y"));
    }

    #[test]
    fn test_parenthesized_entries_are_recorded_not_parsed() {
        let result = parse("@article(A, title = {x})\n@article(A)\n").unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_raw_bibtex_is_captured() {
        let entry = parse_entry("  @misc{A, note = {x}}  ").unwrap();
        assert_eq!(entry.raw_bibtex.as_deref(), Some("@misc{A, note = {x}}"));
    }

    #[test]
    fn test_parse_entry_without_entries_fails() {
        assert_eq!(parse_entry("no entries"), Err(ParseError::InvalidSyntax));
    }
}
