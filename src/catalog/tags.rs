//! Tag Index
//!
//! Groups entries from both catalogs into tag buckets for presentation.
//! Buckets are not mutually exclusive: an entry appears once in every
//! bucket named by a value of its tag mapping. Entries with an empty
//! mapping land in a dedicated uncategorized bucket, surfaced last.

use crate::catalog::GameEntry;
use std::collections::BTreeMap;

/// Display name of the bucket collecting untagged entries.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Tag-grouped view over both catalogs.
#[derive(Debug, Default)]
pub struct TagIndex {
    buckets: BTreeMap<String, Vec<GameEntry>>,
    uncategorized: Vec<GameEntry>,
}

impl TagIndex {
    /// Group steam entries, then non-steam entries, by tag name.
    ///
    /// Within a bucket, entries keep the order of that concatenation; any
    /// sorting is the presentation layer's concern.
    pub fn build(steam: &[GameEntry], non_steam: &[GameEntry]) -> Self {
        let mut index = TagIndex::default();
        for entry in steam.iter().chain(non_steam) {
            index.insert(entry);
        }
        index
    }

    fn insert(&mut self, entry: &GameEntry) {
        if entry.tags.is_empty() {
            self.uncategorized.push(entry.clone());
            return;
        }
        let mut seen: Vec<&str> = Vec::with_capacity(entry.tags.len());
        for name in entry.tag_names() {
            // An entry joins each bucket at most once, even with duplicate
            // tag values under different ids.
            if seen.contains(&name) {
                continue;
            }
            seen.push(name);
            self.buckets
                .entry(name.to_string())
                .or_default()
                .push(entry.clone());
        }
    }

    /// Buckets in lexicographic tag order, with the uncategorized bucket
    /// last and only when non-empty.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[GameEntry])> {
        self.buckets
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
            .chain(
                (!self.uncategorized.is_empty())
                    .then_some((UNCATEGORIZED, self.uncategorized.as_slice())),
            )
    }

    /// Entries of one bucket by name; `UNCATEGORIZED` selects the untagged
    /// bucket.
    pub fn bucket(&self, name: &str) -> Option<&[GameEntry]> {
        if name == UNCATEGORIZED {
            return (!self.uncategorized.is_empty()).then_some(self.uncategorized.as_slice());
        }
        self.buckets.get(name).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty() && self.uncategorized.is_empty()
    }
}
