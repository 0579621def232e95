//! Human and JSON rendering of command results

use crate::diff::SyncPlan;
use crate::executor::ExecutionStats;
use crate::types::{DiffSummary, Manifest, ManifestDiff, ManifestState, MansyncError, SyncAction};
use console::{style, StyledObject};
use indicatif::HumanBytes;
use serde::Serialize;

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, MansyncError> {
    serde_json::to_string_pretty(value).map_err(|e| MansyncError::Io(e.into()))
}

fn state_label(state: ManifestState) -> StyledObject<String> {
    let label = style(format!("{:<9}", state.as_str()));
    match state {
        ManifestState::Unchanged => label.dim(),
        ManifestState::Moved => label.cyan(),
        ManifestState::Changed => label.yellow(),
        ManifestState::Added => label.green(),
        ManifestState::Removed => label.red(),
    }
}

pub(crate) fn format_record(diff: &ManifestDiff) -> String {
    match (diff.state, &diff.last, &diff.current) {
        (ManifestState::Moved, Some(last), Some(current)) => format!(
            "  {} {} -> {}",
            state_label(diff.state),
            last.path(),
            current.path()
        ),
        _ => format!("  {} {}", state_label(diff.state), diff.path()),
    }
}

/// One line per drifted record followed by a summary; unchanged records are counted only
pub(crate) fn format_records(diffs: &[ManifestDiff]) -> String {
    let mut lines: Vec<String> = diffs
        .iter()
        .filter(|d| !d.is_unchanged())
        .map(format_record)
        .collect();

    if lines.is_empty() {
        lines.push("  (no changes)".to_string());
    }
    lines.push(format_summary(&DiffSummary::from_diffs(diffs)));
    lines.join("\n")
}

pub(crate) fn format_summary(summary: &DiffSummary) -> String {
    format!(
        "Summary: {} moved, {} changed, {} added, {} removed, {} unchanged",
        summary.moved, summary.changed, summary.added, summary.removed, summary.unchanged
    )
}

pub(crate) fn format_manifest_written(manifest: &Manifest) -> String {
    format!(
        "Manifest written: {} files | {}",
        manifest.len(),
        HumanBytes(manifest.total_size())
    )
}

pub(crate) fn format_plan_preview(plan: &SyncPlan) -> String {
    format!(
        "Plan:\n  Copy: {}  Rename: {}  Delete: {}  Skip: {}\n  Total bytes to transfer: {}",
        plan.stats.copy_count,
        plan.stats.rename_count,
        plan.stats.delete_count,
        plan.stats.skip_count,
        HumanBytes(plan.stats.total_bytes)
    )
}

pub(crate) fn format_dry_run_actions(plan: &SyncPlan) -> String {
    if plan.is_noop() {
        return "Dry-run actions:\n  (no planned actions)".to_string();
    }

    let mut lines = Vec::with_capacity(plan.actions.len() + plan.prune_dirs.len() + 2);
    lines.push("Dry-run actions:".to_string());
    for action in &plan.actions {
        match action {
            SyncAction::Copy(entry) => lines.push(format!("  COPY      {}", entry.path())),
            SyncAction::Rename { from, to } => {
                lines.push(format!("  RENAME    {} -> {}", from.path(), to.path()))
            }
            SyncAction::Delete(entry) => lines.push(format!("  DELETE    {}", entry.path())),
        }
    }
    for dir in &plan.prune_dirs {
        lines.push(format!("  PRUNE     {}/ (if empty)", dir));
    }

    if plan.stats.skip_count > 0 {
        lines.push(format!(
            "  ({} unchanged file(s) omitted)",
            plan.stats.skip_count
        ));
    }

    lines.join("\n")
}

pub(crate) fn format_execution(stats: &ExecutionStats) -> String {
    let mut line = format!(
        "Done: {}/{} actions | {} copied",
        stats.completed_actions,
        stats.total_actions,
        HumanBytes(stats.bytes_copied)
    );
    if stats.dirs_pruned > 0 {
        line.push_str(&format!(" | {} empty dir(s) removed", stats.dirs_pruned));
    }
    if stats.fallback_copies > 0 {
        line.push_str(&format!(
            " | {} rename(s) fell back to copy",
            stats.fallback_copies
        ));
    }
    line
}
