//! Top-level domain tables.
//!
//! The engine never fetches TLD data itself. Callers hand it a
//! [`TldProvider`]; [`TldLists`] is the stock implementation and can be read
//! from YAML in the `generic:` / `country:` layout of `data/tld_lib.yml`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EntityError, Result};
use crate::text::char_at;

const BUNDLED_TLDS: &str = include_str!("../data/tld_lib.yml");

/// Source of the generic and country-code TLD lists.
pub trait TldProvider {
    /// Generic TLDs (`com`, `org`, ...), in priority order.
    fn generic_tlds(&self) -> &[String];

    /// Country-code TLDs (`jp`, `uk`, ...), in priority order.
    fn country_tlds(&self) -> &[String];
}

/// Plain TLD lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldLists {
    /// Generic TLDs.
    #[serde(default)]
    pub generic: Vec<String>,

    /// Country-code TLDs.
    #[serde(default)]
    pub country: Vec<String>,
}

impl TldLists {
    /// Create lists from any string iterators.
    pub fn new<G, C, S>(generic: G, country: C) -> Self
    where
        G: IntoIterator<Item = S>,
        C: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            generic: generic.into_iter().map(Into::into).collect(),
            country: country.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse lists from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The TLD lists shipped with this crate.
    pub fn bundled() -> Result<Self> {
        Self::from_yaml(BUNDLED_TLDS)
    }
}

impl TldProvider for TldLists {
    fn generic_tlds(&self) -> &[String] {
        &self.generic
    }

    fn country_tlds(&self) -> &[String] {
        &self.country
    }
}

/// Compiled lookup for one TLD list.
///
/// Matches the entry that starts at a position and is followed by an
/// acceptable boundary; among several such entries the earliest in list
/// order wins.
#[derive(Debug, Clone)]
pub(crate) struct TldTable {
    rank: HashMap<String, usize>,
    max_chars: usize,
}

impl TldTable {
    pub(crate) fn new(list: &'static str, entries: &[String]) -> Result<Self> {
        if entries.is_empty() {
            return Err(EntityError::EmptyTldList(list));
        }

        let mut rank = HashMap::with_capacity(entries.len());
        let mut max_chars = 0;
        for (index, entry) in entries.iter().enumerate() {
            let tld = entry.trim().to_lowercase();
            if tld.is_empty()
                || tld
                    .chars()
                    .any(|c| c == '.' || c.is_whitespace() || c.is_control())
            {
                return Err(EntityError::InvalidTld(entry.clone()));
            }
            max_chars = max_chars.max(tld.chars().count());
            rank.entry(tld).or_insert(index);
        }

        Ok(Self { rank, max_chars })
    }

    pub(crate) fn len(&self) -> usize {
        self.rank.len()
    }

    pub(crate) fn contains(&self, tld: &str) -> bool {
        self.rank.contains_key(&tld.to_lowercase())
    }

    /// End offset of the TLD starting at `pos`, if `accept` allows the
    /// character that follows it.
    ///
    /// Candidates are looked up as slices of `text`; a lowercased copy is
    /// only made once an uppercase character shows up.
    pub(crate) fn match_at(
        &self,
        text: &str,
        pos: usize,
        accept: impl Fn(Option<char>) -> bool,
    ) -> Option<usize> {
        let rest = text.get(pos..)?;
        let mut folded: Option<String> = None;
        let mut best: Option<(usize, usize)> = None;

        for (offset, c) in rest.char_indices().take(self.max_chars) {
            if c == '.' || c.is_whitespace() {
                break;
            }
            let len = offset + c.len_utf8();
            if folded.is_none() && !c.to_lowercase().eq([c]) {
                folded = rest.get(..offset).map(str::to_string);
            }
            let key = match folded.as_mut() {
                Some(key) => {
                    key.extend(c.to_lowercase());
                    Some(key.as_str())
                }
                None => rest.get(..len),
            };
            if let Some(&rank) = key.and_then(|key| self.rank.get(key))
                && best.is_none_or(|(best_rank, _)| rank < best_rank)
                && accept(char_at(text, pos + len))
            {
                best = Some((rank, pos + len));
            }
        }

        best.map(|(_, end)| end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(entries: &[&str]) -> TldTable {
        let entries: Vec<String> = entries.iter().map(ToString::to_string).collect();
        TldTable::new("generic", &entries).unwrap()
    }

    fn not_alnum(c: Option<char>) -> bool {
        c.is_none_or(|c| !c.is_ascii_alphanumeric())
    }

    #[test]
    fn test_bundled_lists_load() {
        let lists = TldLists::bundled().unwrap();
        assert!(lists.generic.iter().any(|t| t == "com"));
        assert!(lists.country.iter().any(|t| t == "jp"));
        assert!(lists.country.iter().any(|t| t == "co"));
    }

    #[test]
    fn test_match_requires_boundary() {
        let tlds = table(&["com", "co"]);
        assert_eq!(tlds.match_at("a.com", 2, not_alnum), Some(5));
        assert_eq!(tlds.match_at("a.COM/x", 2, not_alnum), Some(5));
        assert_eq!(tlds.match_at("a.comx", 2, not_alnum), None);
        assert_eq!(tlds.match_at("a.co", 2, not_alnum), Some(4));
    }

    #[test]
    fn test_unicode_entries() {
        let tlds = table(&["рф", "みんな"]);
        assert_eq!(tlds.match_at("пример.рф", 13, not_alnum), Some(17));
        assert!(tlds.contains("РФ"));
        assert_eq!(tlds.match_at("ПРИМЕР.РФ", 13, not_alnum), Some(17));
    }

    #[test]
    fn test_match_stops_at_label_separator() {
        let tlds = table(&["com", "co"]);
        assert_eq!(tlds.match_at("a.co.com", 2, not_alnum), Some(4));
        assert_eq!(tlds.match_at("a.Co", 2, not_alnum), Some(4));
        assert_eq!(tlds.match_at("a.c om", 2, not_alnum), None);
    }

    #[test]
    fn test_rejects_bad_lists() {
        assert!(matches!(
            TldTable::new("country", &[]),
            Err(EntityError::EmptyTldList("country"))
        ));
        assert!(matches!(
            TldTable::new("generic", &["co.uk".to_string()]),
            Err(EntityError::InvalidTld(_))
        ));
    }
}
