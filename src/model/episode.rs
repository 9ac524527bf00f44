use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalizes a chapter display name into an episode index key
///
/// Surrounding whitespace is trimmed, inner runs collapse to one space and
/// the result is uppercased, so `" Chapter\n 3 "` and `"CHAPTER 3"` collide.
pub fn normalize_episode_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Mapping from normalized chapter display name to chapter path for one item
///
/// Keys are normalized on every way in, including deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct EpisodeIndex {
    entries: BTreeMap<String, String>,
}

impl EpisodeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry, replacing any path already held under the same key
    pub fn insert(&mut self, name: &str, path: impl Into<String>) -> Option<String> {
        self.entries.insert(normalize_episode_name(name), path.into())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&normalize_episode_name(name))
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_episode_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries of `self` whose key is absent from `stored` (`self \ stored`)
    pub fn difference(&self, stored: &EpisodeIndex) -> EpisodeIndex {
        let entries = self
            .entries
            .iter()
            .filter(|(name, _)| !stored.entries.contains_key(*name))
            .map(|(name, path)| (name.clone(), path.clone()))
            .collect();
        Self { entries }
    }

    /// Union of `self` and `additions`; entries already in `self` win
    pub fn merged_with(&self, additions: &EpisodeIndex) -> EpisodeIndex {
        let mut entries = self.entries.clone();
        for (name, path) in &additions.entries {
            entries
                .entry(name.clone())
                .or_insert_with(|| path.clone());
        }
        Self { entries }
    }
}

impl From<BTreeMap<String, String>> for EpisodeIndex {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut index = EpisodeIndex::new();
        for (name, path) in raw {
            index.insert(&name, path);
        }
        index
    }
}

impl From<EpisodeIndex> for BTreeMap<String, String> {
    fn from(index: EpisodeIndex) -> Self {
        index.entries
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for EpisodeIndex {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut index = EpisodeIndex::new();
        for (name, path) in iter {
            index.insert(name, path);
        }
        index
    }
}
