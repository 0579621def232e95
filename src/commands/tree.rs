//! Single-directory commands: create, update, verify

use super::render::{format_manifest_written, format_records, to_json};
use super::{load_required, Outcome};
use crate::config::Config;
use crate::diff::diff_manifests;
use crate::manifest::{load_manifest_or_empty, save_manifest};
use crate::scanner::scan_directory;
use crate::types::{DiffSummary, MansyncError};
use crate::verify::verify_directory;

/// Scan `config.source` and write its manifest
pub fn create(config: &Config) -> Result<Outcome, MansyncError> {
    let manifest = scan_directory(&config.source)?;
    save_manifest(&config.source, &manifest)?;

    if config.json {
        println!("{}", to_json(manifest.entries())?);
    } else {
        println!("{}", format_manifest_written(&manifest));
    }
    Ok(Outcome::default())
}

/// Rescan, report against the stored manifest (if any), and save the new one
pub fn update(config: &Config) -> Result<Outcome, MansyncError> {
    let old_manifest = load_manifest_or_empty(&config.source)?;
    let new_manifest = scan_directory(&config.source)?;

    let diffs = diff_manifests(&new_manifest, &old_manifest);
    save_manifest(&config.source, &new_manifest)?;

    if config.json {
        println!("{}", to_json(&diffs)?);
    } else {
        println!("{}", format_records(&diffs));
        println!("{}", format_manifest_written(&new_manifest));
    }
    Ok(Outcome::default())
}

/// Check files against the stored manifest; drift is reported in the outcome
pub fn verify(config: &Config) -> Result<Outcome, MansyncError> {
    let manifest = load_required(&config.source)?;
    let diffs = verify_directory(&config.source, &manifest)?;

    if config.json {
        println!("{}", to_json(&diffs)?);
    } else {
        println!("{}", format_records(&diffs));
    }

    Ok(Outcome {
        drift: DiffSummary::from_diffs(&diffs).has_drift(),
    })
}
