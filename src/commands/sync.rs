//! Two-directory commands: diff, sync, repair

use super::render::{
    format_dry_run_actions, format_execution, format_plan_preview, format_records, to_json,
};
use super::{load_required, Outcome};
use crate::config::Config;
use crate::diff::{diff_manifests, generate_sync_plan};
use crate::executor::{apply, repair as repair_target, ApplyReport};
use crate::manifest::load_manifest_or_empty;
use crate::types::MansyncError;

/// Compare the stored manifests of source (new) and target (old)
pub fn diff(config: &Config) -> Result<Outcome, MansyncError> {
    let target = config.target()?;
    let source_manifest = load_required(&config.source)?;
    let target_manifest = load_required(target)?;

    let diffs = diff_manifests(&source_manifest, &target_manifest);
    if config.json {
        println!("{}", to_json(&diffs)?);
    } else {
        println!("{}", format_records(&diffs));
    }
    Ok(Outcome::default())
}

/// Run the sync operation
///
/// The target's stored manifest (empty if it has none) is the old state.
pub fn sync(config: &Config) -> Result<Outcome, MansyncError> {
    let target = config.target()?;
    let source_manifest = load_required(&config.source)?;
    let target_manifest = load_manifest_or_empty(target)?;

    if config.dry_run {
        let diffs = diff_manifests(&source_manifest, &target_manifest);
        let plan = generate_sync_plan(&diffs, &source_manifest, &target_manifest);
        if config.json {
            println!("{}", to_json(&plan)?);
        } else {
            println!("{}", format_plan_preview(&plan));
            println!("{}", format_dry_run_actions(&plan));
            println!("Dry-run mode: no changes were made.");
        }
        return Ok(Outcome::default());
    }

    let report = apply(&config.source, &source_manifest, target, &target_manifest)?;
    print_report(config, &report)?;
    Ok(Outcome::default())
}

/// Copy drifted files back from the source
pub fn repair(config: &Config) -> Result<Outcome, MansyncError> {
    let target = config.target()?;
    let source_manifest = load_required(&config.source)?;

    let report = repair_target(&config.source, &source_manifest, target)?;
    print_report(config, &report)?;
    Ok(Outcome::default())
}

fn print_report(config: &Config, report: &ApplyReport) -> Result<(), MansyncError> {
    if config.json {
        println!("{}", to_json(report)?);
    } else {
        println!("{}", format_records(&report.diffs));
        println!("{}", format_execution(&report.stats));
    }
    Ok(())
}
