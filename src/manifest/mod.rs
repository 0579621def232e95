//! Manifest persistence
//!
//! Every managed directory stores its manifest in a hidden file at its root.
//! Scans never include that file.

mod codec;

pub use codec::{parse_manifest, serialize_manifest};

use crate::executor::copy::part_path;
use crate::types::{Manifest, MansyncError};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Reserved name of the manifest file inside a managed directory
pub const MANIFEST_FILE_NAME: &str = ".mansync";

/// Location of the manifest file for `dir`
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE_NAME)
}

/// Load the manifest stored in `dir`
///
/// # Errors
/// `Io(NotFound)` if the directory has no manifest, or any parse error.
pub fn load_manifest(dir: &Path) -> Result<Manifest, MansyncError> {
    let path = manifest_path(dir);
    let text = fs::read_to_string(&path)?;
    let manifest = parse_manifest(&text)?;
    tracing::debug!(path = %path.display(), entries = manifest.len(), "loaded manifest");
    Ok(manifest)
}

/// Load the manifest stored in `dir`, treating a missing file as empty
pub fn load_manifest_or_empty(dir: &Path) -> Result<Manifest, MansyncError> {
    match load_manifest(dir) {
        Err(MansyncError::Io(e)) if e.kind() == ErrorKind::NotFound => Ok(Manifest::new()),
        other => other,
    }
}

/// Save `manifest` into `dir`, replacing any previous manifest
///
/// Writes a `.mansync.mansync-part` sibling, syncs it, then renames it into
/// place so a crash never leaves a truncated manifest behind.
pub fn save_manifest(dir: &Path, manifest: &Manifest) -> Result<(), MansyncError> {
    let path = manifest_path(dir);
    let part = part_path(&path);

    let mut part_file = File::create(&part)?;
    part_file.write_all(serialize_manifest(manifest).as_bytes())?;
    part_file.sync_all()?;
    drop(part_file);

    fs::rename(&part, &path)?;
    tracing::debug!(path = %path.display(), entries = manifest.len(), "saved manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ManifestEntry;
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let manifest = Manifest::from(vec![
            ManifestEntry::new("a.txt", 1, "aa").unwrap(),
            ManifestEntry::new("b/c.txt", 2, "bb").unwrap(),
        ]);

        save_manifest(temp_dir.path(), &manifest).unwrap();

        assert!(manifest_path(temp_dir.path()).exists());
        assert!(!temp_dir.path().join(".mansync.mansync-part").exists());
        assert_eq!(load_manifest(temp_dir.path()).unwrap(), manifest);
    }

    #[test]
    fn test_save_overwrites_previous_manifest() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let first = Manifest::from(vec![ManifestEntry::new("old.txt", 1, "aa").unwrap()]);
        let second = Manifest::from(vec![ManifestEntry::new("new.txt", 2, "bb").unwrap()]);

        save_manifest(temp_dir.path(), &first).unwrap();
        save_manifest(temp_dir.path(), &second).unwrap();

        assert_eq!(load_manifest(temp_dir.path()).unwrap(), second);
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let err = load_manifest(temp_dir.path()).unwrap_err();
        assert!(err.is_not_found());
        assert!(load_manifest_or_empty(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_or_empty_still_reports_parse_errors() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(manifest_path(temp_dir.path()), "broken line\n").unwrap();

        let err = load_manifest_or_empty(temp_dir.path()).unwrap_err();
        assert!(err.is_manifest_error());
    }
}
