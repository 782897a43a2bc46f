//! Directory listings synthesized from key prefixes

use serde::{Deserialize, Serialize};

use super::SEPARATOR;

/// One element of a directory listing
///
/// Serializes the way callers of the library expect: a directory as a bare
/// string, a file as `{"fn": name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingEntry {
    /// The next path segment of one or more deeper entries
    Directory(String),

    /// A leaf entry directly at the listed level
    File {
        #[serde(rename = "fn")]
        name: String,
    },
}

impl ListingEntry {
    /// Classify the part of a key below the listed prefix
    ///
    /// Exactly one leading separator is dropped first.
    pub fn from_suffix(suffix: &str) -> Self {
        let suffix = suffix.strip_prefix(SEPARATOR).unwrap_or(suffix);
        match suffix.split_once(SEPARATOR) {
            Some((dir, _)) => ListingEntry::Directory(dir.to_string()),
            None => ListingEntry::File {
                name: suffix.to_string(),
            },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ListingEntry::Directory(name) => name,
            ListingEntry::File { name } => name,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, ListingEntry::Directory(_))
    }
}

/// Ordered directory listing
///
/// Holds one entry per enumerated key, in enumeration order. Several leaves
/// below the same sub-directory therefore produce repeated `Directory`
/// markers; see [`Listing::deduplicated`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Listing(Vec<ListingEntry>);

impl Listing {
    /// Build a listing from keys enumerated under the literal `prefix`
    ///
    /// Keys that do not start with `prefix` are skipped.
    pub fn from_keys<I>(prefix: &str, keys: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let entries = keys
            .into_iter()
            .filter_map(|key| match key.strip_prefix(prefix) {
                Some(suffix) => Some(ListingEntry::from_suffix(suffix)),
                None => {
                    tracing::warn!("Key {} does not start with listing prefix {}", key, prefix);
                    None
                }
            })
            .collect();
        Listing(entries)
    }

    /// Same listing with repeated directory markers collapsed
    ///
    /// Keeps first-seen order. Files are never collapsed.
    pub fn deduplicated(&self) -> Self {
        let mut seen = std::collections::HashSet::new();
        let entries = self
            .0
            .iter()
            .filter(|entry| match entry {
                ListingEntry::Directory(name) => seen.insert(name.as_str()),
                ListingEntry::File { .. } => true,
            })
            .cloned()
            .collect();
        Listing(entries)
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingEntry> {
        self.0.iter()
    }
}

impl From<Vec<ListingEntry>> for Listing {
    fn from(entries: Vec<ListingEntry>) -> Self {
        Listing(entries)
    }
}

impl IntoIterator for Listing {
    type Item = ListingEntry;
    type IntoIter = std::vec::IntoIter<ListingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a ListingEntry;
    type IntoIter = std::slice::Iter<'a, ListingEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
