//! Per-key duplicate summaries

use std::collections::HashMap;

use refdup_bibtex::BibTeXEntry;
use serde::Serialize;

/// A cite key that occurs more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: String,
    /// Index of the first occurrence in the entry sequence
    pub first_position: usize,
    /// Indices of the 2nd..Nth occurrences, ascending
    pub duplicate_positions: Vec<usize>,
}

impl DuplicateGroup {
    /// Total number of occurrences of the key
    pub fn occurrences(&self) -> usize {
        self.duplicate_positions.len() + 1
    }
}

/// Summarize duplicates per key
///
/// Groups are ordered by the first occurrence of their key; keys that occur
/// once are left out. Positions are indices into `entries`.
pub fn duplicate_groups(entries: &[BibTeXEntry]) -> Vec<DuplicateGroup> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for (position, entry) in entries.iter().enumerate() {
        match index.get(entry.cite_key.as_str()).copied() {
            Some(group) => groups[group].duplicate_positions.push(position),
            None => {
                index.insert(entry.cite_key.as_str(), groups.len());
                groups.push(DuplicateGroup {
                    key: entry.cite_key.clone(),
                    first_position: position,
                    duplicate_positions: Vec::new(),
                });
            }
        }
    }

    groups.retain(|g| !g.duplicate_positions.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use refdup_bibtex::BibTeXEntryType;

    fn entries(keys: &[&str]) -> Vec<BibTeXEntry> {
        keys.iter()
            .map(|k| BibTeXEntry::new(k.to_string(), BibTeXEntryType::Misc))
            .collect()
    }

    #[test]
    fn test_groups_follow_first_occurrence_order() {
        let groups = duplicate_groups(&entries(&["B", "A", "C", "A", "B", "A"]));

        assert_eq!(
            groups,
            vec![
                DuplicateGroup {
                    key: "B".to_string(),
                    first_position: 0,
                    duplicate_positions: vec![4],
                },
                DuplicateGroup {
                    key: "A".to_string(),
                    first_position: 1,
                    duplicate_positions: vec![3, 5],
                },
            ]
        );
        assert_eq!(groups[1].occurrences(), 3);
    }

    #[test]
    fn test_unique_keys_have_no_groups() {
        assert!(duplicate_groups(&entries(&["A", "B", "C"])).is_empty());
        assert!(duplicate_groups(&[]).is_empty());
    }
}
