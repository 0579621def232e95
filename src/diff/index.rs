//! Working set of not-yet-matched old entries
//!
//! Lookups by path and by checksum, backed by one liveness table so an entry
//! consumed through either map disappears from both.

use crate::types::ManifestEntry;
use std::collections::{HashMap, VecDeque};

pub(crate) struct OldEntryIndex<'a> {
    entries: &'a [ManifestEntry],
    live: Vec<bool>,
    by_path: HashMap<&'a str, VecDeque<usize>>,
    by_checksum: HashMap<String, VecDeque<usize>>,
}

impl<'a> OldEntryIndex<'a> {
    pub(crate) fn new(entries: &'a [ManifestEntry]) -> Self {
        let mut by_path: HashMap<&'a str, VecDeque<usize>> = HashMap::new();
        let mut by_checksum: HashMap<String, VecDeque<usize>> = HashMap::new();

        for (id, entry) in entries.iter().enumerate() {
            by_path.entry(entry.path()).or_default().push_back(id);
            by_checksum.entry(entry.checksum_key()).or_default().push_back(id);
        }

        Self {
            entries,
            live: vec![true; entries.len()],
            by_path,
            by_checksum,
        }
    }

    /// Remove an entry from the working set and return a copy of it
    pub(crate) fn take(&mut self, id: usize) -> ManifestEntry {
        self.live[id] = false;
        self.entries[id].clone()
    }

    /// First live entry equal to `entry` in every field
    pub(crate) fn find_exact(&self, entry: &ManifestEntry) -> Option<usize> {
        self.by_path
            .get(entry.path())?
            .iter()
            .copied()
            .find(|&id| self.live[id] && self.entries[id] == *entry)
    }

    /// First live entry, in old-manifest order, stored at `path`
    pub(crate) fn first_by_path(&mut self, path: &str) -> Option<usize> {
        let bucket = self.by_path.get_mut(path)?;
        first_live(bucket, &self.live)
    }

    /// First live entry, in old-manifest order, with checksum `key` (lowercase)
    pub(crate) fn first_by_checksum(&mut self, key: &str) -> Option<usize> {
        let bucket = self.by_checksum.get_mut(key)?;
        first_live(bucket, &self.live)
    }

    /// Whether a live entry at `path` also carries checksum `key`
    pub(crate) fn path_has_checksum(&self, path: &str, key: &str) -> bool {
        self.by_path.get(path).is_some_and(|bucket| {
            bucket
                .iter()
                .any(|&id| self.live[id] && self.entries[id].checksum_matches(key))
        })
    }

    /// Entries never consumed, in old-manifest order
    pub(crate) fn into_remaining(self) -> impl Iterator<Item = ManifestEntry> + 'a {
        let live = self.live;
        self.entries
            .iter()
            .enumerate()
            .filter(move |(id, _)| live[*id])
            .map(|(_, entry)| entry.clone())
    }
}

/// Drop dead ids from the front of a bucket; each id is popped at most once.
fn first_live(bucket: &mut VecDeque<usize>, live: &[bool]) -> Option<usize> {
    while let Some(&id) = bucket.front() {
        if live[id] {
            return Some(id);
        }
        bucket.pop_front();
    }
    None
}
