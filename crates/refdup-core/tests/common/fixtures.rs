//! Test fixture loading utilities

use std::path::PathBuf;

/// Get the path to a fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a BibTeX fixture
pub fn load_bibtex_fixture(name: &str) -> String {
    let path = fixture_path(&format!("bibtex/{}", name));
    std::fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", path.display()))
}

/// Build a minimal document from `(key, doi)` pairs
///
/// Each entry is `@article{key,` with an optional `doi = {...},` line.
pub fn make_bib(entries: &[(&str, Option<&str>)]) -> String {
    entries
        .iter()
        .map(|(key, doi)| {
            let mut chunk = format!("@article{{{},\n", key);
            if let Some(doi) = doi {
                chunk.push_str(&format!("doi = {{{}}},\n", doi));
            }
            chunk.push_str("}\n");
            chunk
        })
        .collect::<Vec<_>>()
        .join("\n")
}
