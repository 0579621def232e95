//! Integrity verification against a single manifest
//!
//! Each entry is re-checked on disk. Without a second manifest nothing can be
//! `Moved` or `Added`; records are `Unchanged`, `Changed` or `Removed`.

use crate::hash::compute_checksum;
use crate::resolve::{PlatformResolver, RealEntry, ResolveEntry};
use crate::types::{Manifest, ManifestDiff, ManifestEntry, MansyncError};
use std::path::Path;

/// Verify `root` against `manifest`, one record per entry in manifest order
///
/// * Missing file (including one whose parent is now a file), broken
///   symlink, or non-file → `Removed`
/// * Size differs → `Changed`, with an empty checksum on the current side
///   (the file is not hashed)
/// * Checksum differs (ignoring case) → `Changed` with the live checksum
/// * Otherwise → `Unchanged`
///
/// # Errors
/// `DirectoryNotFound` if `root` is not a directory; hashing failures on
/// present files propagate as `Io`.
pub fn verify_directory(root: &Path, manifest: &Manifest) -> Result<Vec<ManifestDiff>, MansyncError> {
    verify_directory_with(root, manifest, &PlatformResolver)
}

/// Verify `root` using a custom symlink resolver
pub fn verify_directory_with<R: ResolveEntry + ?Sized>(
    root: &Path,
    manifest: &Manifest,
    resolver: &R,
) -> Result<Vec<ManifestDiff>, MansyncError> {
    if !root.is_dir() {
        return Err(MansyncError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut diffs = Vec::with_capacity(manifest.len());
    for entry in manifest {
        let diff = verify_entry(root, entry, resolver)?;
        if !diff.is_unchanged() {
            tracing::debug!(path = entry.path(), state = %diff.state, "drift detected");
        }
        diffs.push(diff);
    }

    Ok(diffs)
}

fn verify_entry<R: ResolveEntry + ?Sized>(
    root: &Path,
    entry: &ManifestEntry,
    resolver: &R,
) -> Result<ManifestDiff, MansyncError> {
    let path = entry.native_path(root);

    let real = match resolver.resolve(&path) {
        Ok(RealEntry { is_file: true, size, .. }) => size,
        Ok(_) => return Ok(ManifestDiff::removed(entry.clone())),
        Err(e) if e.is_not_found() => return Ok(ManifestDiff::removed(entry.clone())),
        Err(e) => return Err(e),
    };

    if real != entry.size() {
        return Ok(ManifestDiff::changed(entry.clone(), entry.observed(real, "")));
    }

    let checksum = compute_checksum(&path)?;
    let current = entry.observed(real, checksum);
    if entry.checksum_matches(current.checksum()) {
        Ok(ManifestDiff::unchanged(entry.clone(), current))
    } else {
        Ok(ManifestDiff::changed(entry.clone(), current))
    }
}
