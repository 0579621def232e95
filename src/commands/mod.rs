//! Command implementations behind the CLI

mod render;
pub mod sync;
pub mod tree;

use crate::config::{Config, Mode};
use crate::manifest::{load_manifest, manifest_path};
use crate::types::{Manifest, MansyncError};
use std::path::Path;

/// What the binary needs to know after a command ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// `verify` found at least one record that is not `unchanged`
    pub drift: bool,
}

/// Dispatch the configured command
pub fn run(config: &Config) -> Result<Outcome, MansyncError> {
    tracing::debug!(mode = ?config.mode, source = %config.source.display(), "running");

    match config.mode {
        Mode::Create => tree::create(config),
        Mode::Update => tree::update(config),
        Mode::Verify => tree::verify(config),
        Mode::Diff => sync::diff(config),
        Mode::Sync => sync::sync(config),
        Mode::Repair => sync::repair(config),
    }
}

/// Load the manifest a command cannot run without
fn load_required(dir: &Path) -> Result<Manifest, MansyncError> {
    if !manifest_path(dir).is_file() {
        return Err(MansyncError::Config(format!(
            "No manifest found in {}; run `mansync create` first",
            dir.display()
        )));
    }
    load_manifest(dir)
}
