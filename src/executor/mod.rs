//! Executor module for file operations
//!
//! Runs a [`SyncPlan`] against a target tree, fail-fast: the first I/O error
//! aborts the run and leaves the target partially synced. Re-running
//! `verify` then `repair` or `sync` converges it.

pub mod copy;

use crate::diff::{diff_manifests, generate_repair_plan, generate_sync_plan, SyncPlan};
use crate::manifest::save_manifest;
use crate::types::{Manifest, ManifestDiff, ManifestEntry, MansyncError, SyncAction, PATH_SEPARATOR};
use crate::verify::verify_directory;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub use copy::copy_file_atomic;

/// Execution statistics for a sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionStats {
    /// Number of actions in the input plan.
    pub total_actions: usize,
    /// Number of successfully processed actions.
    pub completed_actions: usize,
    /// Renames whose source was gone and were copied from the source tree instead.
    pub fallback_copies: usize,
    /// Deletes whose file was already absent.
    pub already_absent: usize,
    /// Empty directories removed, by pruning or to make room for a file.
    pub dirs_pruned: usize,
    /// Aggregate copied bytes.
    pub bytes_copied: u64,
}

/// Result of [`apply`] or [`repair`]
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    /// Every diff record, `unchanged` included, in plan order
    pub diffs: Vec<ManifestDiff>,
    pub stats: ExecutionStats,
}

/// Execute a sync plan
///
/// Actions run sequentially in plan order. Afterwards each directory in
/// `plan.prune_dirs` is removed if it exists and is empty.
///
/// * `Copy` reads from `source_root`, writes to `target_root`
/// * `Rename` moves within `target_root`; if the rename source is missing
///   the destination is copied from `source_root` instead
/// * `Delete` of a file that is already gone succeeds
/// * A `Copy` or `Rename` destination that is a directory holding only empty
///   directories is removed first
pub fn execute_plan(
    plan: &SyncPlan,
    source_root: &Path,
    target_root: &Path,
) -> Result<ExecutionStats, MansyncError> {
    let mut stats = ExecutionStats {
        total_actions: plan.actions.len(),
        ..Default::default()
    };

    for (idx, action) in plan.actions.iter().enumerate() {
        tracing::debug!(
            index = idx + 1,
            total = stats.total_actions,
            action = action.action_name(),
            path = action.path(),
            "executing"
        );

        execute_action(action, source_root, target_root, &mut stats).map_err(|err| {
            tracing::error!(action = action.action_name(), path = action.path(), %err, "sync aborted");
            err
        })?;
        stats.completed_actions += 1;
    }

    for dir in &plan.prune_dirs {
        if prune_if_empty(&relative_to(target_root, dir))? {
            tracing::debug!(dir = dir.as_str(), "pruned empty directory");
            stats.dirs_pruned += 1;
        }
    }

    Ok(stats)
}

fn execute_action(
    action: &SyncAction,
    source_root: &Path,
    target_root: &Path,
    stats: &mut ExecutionStats,
) -> Result<(), MansyncError> {
    match action {
        SyncAction::Copy(entry) => copy_entry(entry, source_root, target_root, stats)?,
        SyncAction::Rename { from, to } => {
            let from_path = from.native_path(target_root);
            match fs::symlink_metadata(&from_path) {
                Ok(_) => {
                    let to_path = to.native_path(target_root);
                    stats.dirs_pruned += remove_empty_tree(&to_path)?;
                    if let Some(parent) = to_path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::rename(&from_path, &to_path)?;
                }
                Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                    tracing::debug!(from = from.path(), to = to.path(), "rename source missing, copying");
                    copy_entry(to, source_root, target_root, stats)?;
                    stats.fallback_copies += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
        SyncAction::Delete(entry) => match fs::remove_file(entry.native_path(target_root)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => stats.already_absent += 1,
            Err(e) => return Err(e.into()),
        },
    }
    Ok(())
}

fn copy_entry(
    entry: &ManifestEntry,
    source_root: &Path,
    target_root: &Path,
    stats: &mut ExecutionStats,
) -> Result<(), MansyncError> {
    let dest = entry.native_path(target_root);
    stats.dirs_pruned += remove_empty_tree(&dest)?;
    stats.bytes_copied += copy_file_atomic(&entry.native_path(source_root), &dest)?;
    Ok(())
}

/// Remove `dir` and the directories below it, provided none of them holds a
/// file. Returns the number of directories removed; a path that is not a
/// directory is left alone.
///
/// Clears the place of a file that replaces a directory whose tracked files
/// were deleted earlier in the plan. Untracked files make this fail.
fn remove_empty_tree(dir: &Path) -> Result<usize, MansyncError> {
    match fs::symlink_metadata(dir) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Ok(0),
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => return Ok(0),
        Err(e) => return Err(e.into()),
    }

    let mut removed = 0;
    for child in fs::read_dir(dir)? {
        let child = child?;
        if child.file_type()?.is_dir() {
            removed += remove_empty_tree(&child.path())?;
        }
    }

    fs::remove_dir(dir)?;
    tracing::debug!(dir = %dir.display(), "removed directory in place of a file");
    Ok(removed + 1)
}

/// Remove `dir` if it is a directory with no entries. Returns whether it was removed.
fn prune_if_empty(dir: &Path) -> Result<bool, MansyncError> {
    match fs::symlink_metadata(dir) {
        Ok(metadata) if metadata.is_dir() => {}
        Ok(_) => return Ok(false),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    }
    if fs::read_dir(dir)?.next().is_some() {
        return Ok(false);
    }

    fs::remove_dir(dir)?;
    Ok(true)
}

fn relative_to(root: &Path, rel: &str) -> PathBuf {
    rel.split(PATH_SEPARATOR)
        .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
}

/// Bring `target_root` in line with `source_manifest`
///
/// Diffs `source_manifest` (new) against `target_manifest` (old), executes
/// the resulting plan, then writes `source_manifest` as the target's
/// manifest file. `target_root` is created if missing.
///
/// # Example
/// ```no_run
/// use mansync::executor::apply;
/// use mansync::manifest::{load_manifest, load_manifest_or_empty};
/// use std::path::Path;
///
/// let (src, dst) = (Path::new("photos"), Path::new("/mnt/backup/photos"));
/// let report = apply(src, &load_manifest(src)?, dst, &load_manifest_or_empty(dst)?)?;
/// println!("{} bytes copied", report.stats.bytes_copied);
/// # Ok::<(), mansync::types::MansyncError>(())
/// ```
pub fn apply(
    source_root: &Path,
    source_manifest: &Manifest,
    target_root: &Path,
    target_manifest: &Manifest,
) -> Result<ApplyReport, MansyncError> {
    fs::create_dir_all(target_root)?;

    let diffs = diff_manifests(source_manifest, target_manifest);
    let plan = generate_sync_plan(&diffs, source_manifest, target_manifest);
    let stats = execute_plan(&plan, source_root, target_root)?;

    save_manifest(target_root, source_manifest)?;
    tracing::info!(
        actions = stats.completed_actions,
        bytes = stats.bytes_copied,
        pruned = stats.dirs_pruned,
        "sync complete"
    );

    Ok(ApplyReport {
        diffs,
        stats,
    })
}

/// Restore drifted files in `target_root` from `source_root`
///
/// Verifies `target_root` against `source_manifest` and copies every
/// `changed` or `removed` file back from the source, then writes
/// `source_manifest` as the target's manifest file. Untracked files in the
/// target are left alone.
pub fn repair(
    source_root: &Path,
    source_manifest: &Manifest,
    target_root: &Path,
) -> Result<ApplyReport, MansyncError> {
    fs::create_dir_all(target_root)?;

    let diffs = verify_directory(target_root, source_manifest)?;
    let plan = generate_repair_plan(&diffs);
    let stats = execute_plan(&plan, source_root, target_root)?;

    save_manifest(target_root, source_manifest)?;
    tracing::info!(restored = stats.completed_actions, bytes = stats.bytes_copied, "repair complete");

    Ok(ApplyReport {
        diffs,
        stats,
    })
}
