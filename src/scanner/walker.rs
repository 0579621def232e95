//! Sequential directory walker

use crate::executor::copy::PART_SUFFIX;
use crate::hash::compute_checksum;
use crate::manifest::MANIFEST_FILE_NAME;
use crate::resolve::{PlatformResolver, ResolveEntry};
use crate::types::{Manifest, ManifestEntry, MansyncError, PATH_SEPARATOR};
use camino::Utf8Path;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Instant;

/// Scan a directory and build its manifest
///
/// Walks the tree recursively, keeping regular files and symlinks that
/// resolve to regular files. The reserved manifest file and leftover
/// `*.mansync-part` files from interrupted writes are skipped at any depth.
/// Every kept file is hashed.
///
/// # Arguments
/// * `root_path` - The root directory to scan
///
/// # Returns
/// * `Ok(Manifest)` - Entries in traversal order (empty if no files)
/// * `Err(MansyncError)` - `DirectoryNotFound` if the root is missing,
///   otherwise the first IO failure
///
/// # Errors
/// * Broken symlinks are skipped with a warning
/// * Non-UTF-8 file names fail with `InvalidPath`
pub fn scan_directory(root_path: &Path) -> Result<Manifest, MansyncError> {
    scan_directory_with(root_path, &PlatformResolver)
}

/// Scan a directory using a custom symlink resolver
pub fn scan_directory_with<R: ResolveEntry + ?Sized>(
    root_path: &Path,
    resolver: &R,
) -> Result<Manifest, MansyncError> {
    let start_time = Instant::now();

    if !root_path.is_dir() {
        return Err(MansyncError::DirectoryNotFound {
            path: root_path.to_path_buf(),
        });
    }

    // No ignore-file filtering: every file in the tree is tracked.
    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .hidden(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut manifest = Manifest::new();

    for result in walker {
        let entry = result.map_err(walk_error)?;

        if entry.depth() == 0 {
            continue;
        }

        let file_type = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };

        if file_type.is_dir() || is_reserved_name(entry.file_name()) {
            continue;
        }

        if !file_type.is_file() && !file_type.is_symlink() {
            tracing::warn!(path = %entry.path().display(), "skipping special file");
            continue;
        }

        let real = match resolver.resolve(entry.path()) {
            Ok(real) => real,
            Err(MansyncError::BrokenSymlink { path }) => {
                tracing::warn!(path = %path.display(), "skipping broken symlink");
                continue;
            }
            Err(e) => return Err(e),
        };

        if !real.is_file {
            tracing::debug!(path = %entry.path().display(), "skipping symlink to non-file");
            continue;
        }

        let relative_path = relative_manifest_path(root_path, entry.path())?;
        let checksum = compute_checksum(entry.path())?;

        tracing::debug!(path = %relative_path, size = real.size, "scanned");
        manifest.push(ManifestEntry::new(relative_path, real.size, checksum)?);
    }

    tracing::info!(
        root = %root_path.display(),
        files = manifest.len(),
        bytes = manifest.total_size(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "scan complete"
    );

    Ok(manifest)
}

fn is_reserved_name(name: &OsStr) -> bool {
    name == MANIFEST_FILE_NAME || name.to_str().is_some_and(|name| name.ends_with(PART_SUFFIX))
}

/// Path of `path` relative to `root`, joined with `/`
fn relative_manifest_path(root: &Path, path: &Path) -> Result<String, MansyncError> {
    let relative = path.strip_prefix(root).map_err(|_| MansyncError::InvalidPath {
        path: path.display().to_string(),
        reason: format!("not under scan root {}", root.display()),
    })?;

    let utf8 = Utf8Path::from_path(relative).ok_or_else(|| MansyncError::InvalidPath {
        path: relative.display().to_string(),
        reason: "file name is not valid UTF-8".to_string(),
    })?;

    let separator = PATH_SEPARATOR.to_string();
    Ok(utf8
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join(&separator))
}

fn walk_error(error: ignore::Error) -> MansyncError {
    let message = error.to_string();
    match error.into_io_error() {
        Some(io) => MansyncError::Io(io),
        None => MansyncError::Io(std::io::Error::other(message)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(manifest: &Manifest) -> Vec<&str> {
        manifest.iter().map(|e| e.path()).collect()
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let manifest = scan_directory(temp_dir.path()).expect("scan should succeed on empty dir");
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_scan_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let missing = temp_dir.path().join("missing");

        let err = scan_directory(&missing).unwrap_err();
        assert!(matches!(err, MansyncError::DirectoryNotFound { .. }));
    }

    #[test]
    fn test_scan_single_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join("test.txt"), b"Hello, World!").unwrap();

        let manifest = scan_directory(temp_dir.path()).expect("scan should succeed");
        assert_eq!(manifest.len(), 1);

        let entry = manifest.get("test.txt").expect("Entry should exist");
        assert_eq!(entry.size(), 13);
        assert_eq!(
            entry.checksum(),
            blake3::hash(b"Hello, World!").to_hex().as_str()
        );
    }

    #[test]
    fn test_scan_nested_directories_use_forward_slashes() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::create_dir(root.join("c")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::write(root.join("a/b/file.txt"), b"File 1").unwrap();
        fs::write(root.join("c/file2.txt"), b"File 2 content").unwrap();

        let manifest = scan_directory(root).expect("scan should succeed");

        assert_eq!(paths(&manifest), vec!["a/b/file.txt", "c/file2.txt"]);
        assert_eq!(manifest.total_size(), 20);
    }

    #[test]
    fn test_scan_excludes_manifest_file_at_any_depth() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join(MANIFEST_FILE_NAME), b"x\t1\taa\n").unwrap();
        fs::write(root.join("sub").join(MANIFEST_FILE_NAME), b"").unwrap();
        fs::write(root.join("sub/keep.txt"), b"keep").unwrap();

        let manifest = scan_directory(root).expect("scan should succeed");
        assert_eq!(paths(&manifest), vec!["sub/keep.txt"]);
    }

    #[test]
    fn test_scan_skips_interrupted_write_leftovers() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir(root.join("sub")).unwrap();
        fs::write(root.join(".mansync.mansync-part"), b"x\t1\taa\n").unwrap();
        fs::write(root.join("sub/photo.jpg.mansync-part"), b"half a photo").unwrap();
        fs::write(root.join("sub/photo.jpg"), b"whole photo").unwrap();
        fs::write(root.join("notes.part"), b"ordinary file").unwrap();

        let manifest = scan_directory(root).expect("scan should succeed");
        assert_eq!(paths(&manifest), vec!["notes.part", "sub/photo.jpg"]);
    }

    #[test]
    fn test_scan_includes_hidden_and_ignored_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".gitignore"), "*.log\n").unwrap();
        fs::write(root.join("debug.log"), "log").unwrap();
        fs::write(root.join(".hidden"), "secret").unwrap();

        let manifest = scan_directory(root).expect("scan should succeed");

        assert!(manifest.get("debug.log").is_some());
        assert!(manifest.get(".hidden").is_some());
        assert!(manifest.get(".gitignore").is_some());
    }

    #[test]
    #[cfg(unix)]
    fn test_scan_follows_file_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::write(root.join("target.txt"), b"Target content").unwrap();
        std::os::unix::fs::symlink("target.txt", root.join("link.txt")).unwrap();

        let manifest = scan_directory(root).expect("scan should succeed");

        let link = manifest.get("link.txt").expect("symlink should be tracked");
        let target = manifest.get("target.txt").expect("target should be tracked");
        assert_eq!(link.size(), 14);
        assert_eq!(link.checksum(), target.checksum());
    }

    #[test]
    #[cfg(unix)]
    fn test_scan_skips_broken_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        std::os::unix::fs::symlink(root.join("nonexistent.txt"), root.join("broken_link.txt"))
            .unwrap();
        fs::write(root.join("real.txt"), b"real").unwrap();

        let manifest = scan_directory(root).expect("broken symlinks must not fail the scan");
        assert_eq!(paths(&manifest), vec!["real.txt"]);
    }

    #[test]
    #[cfg(unix)]
    fn test_scan_skips_directory_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();
        fs::create_dir(root.join("dir")).unwrap();
        fs::write(root.join("dir/file.txt"), b"x").unwrap();
        std::os::unix::fs::symlink("dir", root.join("dir_link")).unwrap();

        let manifest = scan_directory(root).expect("scan should succeed");
        assert_eq!(paths(&manifest), vec!["dir/file.txt"]);
    }
}
