//! ManifestState / ManifestDiff - Classified comparison records

use super::ManifestEntry;
use serde::Serialize;
use std::fmt;

/// Classification of one diff record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestState {
    Unchanged,
    Moved,
    Changed,
    Added,
    Removed,
}

impl ManifestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManifestState::Unchanged => "unchanged",
            ManifestState::Moved => "moved",
            ManifestState::Changed => "changed",
            ManifestState::Added => "added",
            ManifestState::Removed => "removed",
        }
    }
}

impl fmt::Display for ManifestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One change record.
///
/// `last` is absent for `Added`, `current` is absent for `Removed`; both are
/// present otherwise. `displaced` is only set on `Moved` records, holding the
/// old entry that used to live at the destination path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDiff {
    pub state: ManifestState,
    pub last: Option<ManifestEntry>,
    pub current: Option<ManifestEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub displaced: Option<ManifestEntry>,
}

impl ManifestDiff {
    pub fn unchanged(last: ManifestEntry, current: ManifestEntry) -> Self {
        Self::paired(ManifestState::Unchanged, last, current)
    }

    pub fn changed(last: ManifestEntry, current: ManifestEntry) -> Self {
        Self::paired(ManifestState::Changed, last, current)
    }

    pub fn moved(last: ManifestEntry, current: ManifestEntry, displaced: Option<ManifestEntry>) -> Self {
        Self {
            displaced,
            ..Self::paired(ManifestState::Moved, last, current)
        }
    }

    pub fn added(current: ManifestEntry) -> Self {
        Self {
            state: ManifestState::Added,
            last: None,
            current: Some(current),
            displaced: None,
        }
    }

    pub fn removed(last: ManifestEntry) -> Self {
        Self {
            state: ManifestState::Removed,
            last: Some(last),
            current: None,
            displaced: None,
        }
    }

    fn paired(state: ManifestState, last: ManifestEntry, current: ManifestEntry) -> Self {
        Self {
            state,
            last: Some(last),
            current: Some(current),
            displaced: None,
        }
    }

    /// Current path if known, otherwise the previous one
    pub fn path(&self) -> &str {
        self.current
            .as_ref()
            .or(self.last.as_ref())
            .map(ManifestEntry::path)
            .unwrap_or_default()
    }

    pub fn is_unchanged(&self) -> bool {
        self.state == ManifestState::Unchanged
    }
}

/// Per-state record counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub unchanged: usize,
    pub moved: usize,
    pub changed: usize,
    pub added: usize,
    pub removed: usize,
}

impl DiffSummary {
    pub fn from_diffs(diffs: &[ManifestDiff]) -> Self {
        let mut summary = Self::default();
        for diff in diffs {
            match diff.state {
                ManifestState::Unchanged => summary.unchanged += 1,
                ManifestState::Moved => summary.moved += 1,
                ManifestState::Changed => summary.changed += 1,
                ManifestState::Added => summary.added += 1,
                ManifestState::Removed => summary.removed += 1,
            }
        }
        summary
    }

    /// True when any record is not `unchanged`
    pub fn has_drift(&self) -> bool {
        self.moved + self.changed + self.added + self.removed > 0
    }

    pub fn total(&self) -> usize {
        self.unchanged + self.moved + self.changed + self.added + self.removed
    }
}
