//! SyncAction plan generation

use crate::types::{Manifest, ManifestDiff, ManifestEntry, ManifestState, SyncAction, PATH_SEPARATOR};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

/// Sync plan: file actions in diff order, then directories to prune
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SyncPlan {
    /// File operations to execute, in order
    pub actions: Vec<SyncAction>,

    /// Directories implied only by the old manifest, deepest first.
    /// Each is removed after the file actions if it is empty on disk.
    pub prune_dirs: Vec<String>,

    /// Aggregate statistics about the plan
    pub stats: PlanStats,
}

impl SyncPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an action to the plan and update statistics
    pub fn add_action(&mut self, action: SyncAction) {
        match &action {
            SyncAction::Copy(entry) => {
                self.stats.copy_count += 1;
                self.stats.total_bytes += entry.size();
            }
            SyncAction::Rename { .. } => self.stats.rename_count += 1,
            SyncAction::Delete(_) => self.stats.delete_count += 1,
        }
        self.actions.push(action);
    }

    /// True when executing the plan would not touch any file
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty() && self.prune_dirs.is_empty()
    }
}

/// Statistics about a sync plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlanStats {
    /// Number of Copy actions
    pub copy_count: usize,

    /// Number of Rename actions
    pub rename_count: usize,

    /// Number of Delete actions
    pub delete_count: usize,

    /// Number of unchanged records that need no action
    pub skip_count: usize,

    /// Bytes to copy from the source tree
    pub total_bytes: u64,
}

/// Generate a sync plan from diff records
///
/// `new_manifest` and `old_manifest` must be the manifests the diff was
/// computed from; they determine which directories disappear.
///
/// When a path turns from a file into a directory or back, the old files in
/// the way are deleted right before the write that needs their place. A move
/// whose source had to be deleted that way becomes a `Copy`.
///
/// # Example
/// ```
/// use mansync::diff::{diff_manifests, generate_sync_plan};
/// use mansync::types::{Manifest, ManifestEntry};
///
/// let old = Manifest::from(vec![ManifestEntry::new("old/a.txt", 4, "h1")?]);
/// let new = Manifest::from(vec![ManifestEntry::new("new/a.txt", 4, "h1")?]);
///
/// let diffs = diff_manifests(&new, &old);
/// let plan = generate_sync_plan(&diffs, &new, &old);
/// assert_eq!(plan.stats.rename_count, 1);
/// assert_eq!(plan.prune_dirs, vec!["old".to_string()]);
/// # Ok::<(), mansync::types::MansyncError>(())
/// ```
pub fn generate_sync_plan(
    diffs: &[ManifestDiff],
    new_manifest: &Manifest,
    old_manifest: &Manifest,
) -> SyncPlan {
    let mut plan = SyncPlan::new();
    let mut obstacles = Obstacles::new(old_manifest);

    for diff in diffs {
        match (diff.state, &diff.last, &diff.current) {
            (ManifestState::Unchanged, _, _) => plan.stats.skip_count += 1,
            (ManifestState::Added | ManifestState::Changed, _, Some(current)) => {
                obstacles.clear_for(current, &mut plan);
                plan.add_action(SyncAction::Copy(current.clone()));
            }
            (ManifestState::Moved, Some(last), Some(current)) => {
                obstacles.clear_for(current, &mut plan);
                if obstacles.was_cleared(last.path()) {
                    plan.add_action(SyncAction::Copy(current.clone()));
                } else {
                    obstacles.vacate(last.path());
                    plan.add_action(SyncAction::Rename {
                        from: last.clone(),
                        to: current.clone(),
                    });
                }
            }
            (ManifestState::Removed, Some(last), _) => {
                if !obstacles.was_cleared(last.path()) {
                    plan.add_action(SyncAction::Delete(last.clone()));
                }
            }
            (state, _, _) => {
                tracing::warn!(path = diff.path(), %state, "ignoring incomplete diff record");
            }
        }
    }

    plan.prune_dirs = vanished_directories(new_manifest, old_manifest);
    plan
}

/// Old files occupying a place a new file needs: a file where the new one
/// needs a parent directory, or the contents of a directory where the new
/// file itself goes.
struct Obstacles<'a> {
    old_manifest: &'a Manifest,
    old_files: HashMap<&'a str, &'a ManifestEntry>,
    old_dirs: BTreeSet<&'a str>,
    /// Old paths already emptied by an earlier rename
    vacated: HashSet<String>,
    /// Old paths deleted ahead of a write
    cleared: HashSet<String>,
}

impl<'a> Obstacles<'a> {
    fn new(old_manifest: &'a Manifest) -> Self {
        Self {
            old_manifest,
            old_files: old_manifest.iter().map(|entry| (entry.path(), entry)).collect(),
            old_dirs: implied_directories(old_manifest),
            vacated: HashSet::new(),
            cleared: HashSet::new(),
        }
    }

    /// Emit `Delete` actions for every old file still standing in the way of `dest`
    fn clear_for(&mut self, dest: &ManifestEntry, plan: &mut SyncPlan) {
        let mut blocking: Vec<&'a ManifestEntry> = dest
            .parent_dirs()
            .filter_map(|dir| self.old_files.get(dir).copied())
            .collect();

        if self.old_dirs.contains(dest.path()) {
            let old_manifest = self.old_manifest;
            let prefix = format!("{}{}", dest.path(), PATH_SEPARATOR);
            blocking.extend(old_manifest.iter().filter(|entry| entry.path().starts_with(&prefix)));
        }

        for entry in blocking {
            if self.vacated.contains(entry.path()) || !self.cleared.insert(entry.path().to_string()) {
                continue;
            }
            tracing::debug!(path = entry.path(), blocks = dest.path(), "clearing old file ahead of write");
            plan.add_action(SyncAction::Delete(entry.clone()));
        }
    }

    fn vacate(&mut self, path: &str) {
        self.vacated.insert(path.to_string());
    }

    fn was_cleared(&self, path: &str) -> bool {
        self.cleared.contains(path)
    }
}

/// Plan that restores drifted files from verification records
///
/// Every `Changed` or `Removed` record becomes a `Copy` of the recorded
/// entry. Nothing is renamed, deleted or pruned.
pub fn generate_repair_plan(diffs: &[ManifestDiff]) -> SyncPlan {
    let mut plan = SyncPlan::new();

    for diff in diffs {
        match (diff.state, &diff.last) {
            (ManifestState::Changed | ManifestState::Removed, Some(last)) => {
                plan.add_action(SyncAction::Copy(last.clone()));
            }
            _ => plan.stats.skip_count += 1,
        }
    }

    plan
}

/// Directories implied by `old` but not by `new`, deepest first
fn vanished_directories(new_manifest: &Manifest, old_manifest: &Manifest) -> Vec<String> {
    let kept = implied_directories(new_manifest);
    let mut vanished: Vec<&str> = implied_directories(old_manifest)
        .difference(&kept)
        .copied()
        .collect();

    vanished.sort_by(|a, b| depth(b).cmp(&depth(a)).then_with(|| b.cmp(a)));
    vanished.into_iter().map(str::to_string).collect()
}

fn implied_directories(manifest: &Manifest) -> BTreeSet<&str> {
    manifest.iter().flat_map(|entry| entry.parent_dirs()).collect()
}

fn depth(dir: &str) -> usize {
    dir.matches(PATH_SEPARATOR).count()
}
