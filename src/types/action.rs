//! SyncAction - File operations derived from a diff

use super::ManifestEntry;
use serde::Serialize;

/// One planned file operation against the target tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SyncAction {
    /// Copy `entry` from source to target (added or changed)
    Copy(ManifestEntry),

    /// Rename within the target tree (moved).
    ///
    /// Falls back to copying `to` from the source when `from` is gone.
    Rename { from: ManifestEntry, to: ManifestEntry },

    /// Delete a file from the target tree (removed)
    Delete(ManifestEntry),
}

impl SyncAction {
    /// Get the target-relative path this action writes or deletes
    pub fn path(&self) -> &str {
        match self {
            SyncAction::Copy(entry) | SyncAction::Delete(entry) => entry.path(),
            SyncAction::Rename { to, .. } => to.path(),
        }
    }

    pub fn action_name(&self) -> &'static str {
        match self {
            SyncAction::Copy(_) => "Copy",
            SyncAction::Rename { .. } => "Rename",
            SyncAction::Delete(_) => "Delete",
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, SyncAction::Copy(_))
    }

    pub fn is_rename(&self) -> bool {
        matches!(self, SyncAction::Rename { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, SyncAction::Delete(_))
    }
}
