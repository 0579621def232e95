//! Symlink-aware metadata resolution
//!
//! Callers ask for the *real* entry behind a path: a regular file reports its
//! own metadata, a symlink reports its target's. A link whose target cannot be
//! read surfaces as `MansyncError::BrokenSymlink` on every platform.

use crate::types::MansyncError;
use std::fs::{self, Metadata};
use std::path::Path;

/// Metadata of the entry a path ultimately refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealEntry {
    /// Size of the real file in bytes
    pub size: u64,
    /// Whether the real entry is a regular file
    pub is_file: bool,
    /// Whether the requested path itself was a symlink
    pub is_symlink: bool,
}

impl RealEntry {
    fn from_metadata(metadata: &Metadata, is_symlink: bool) -> Self {
        Self {
            size: metadata.len(),
            is_file: metadata.is_file(),
            is_symlink,
        }
    }
}

/// Resolve real file metadata for a path
pub trait ResolveEntry {
    /// # Errors
    /// * `Io` if `path` itself cannot be stat'ed (e.g. it does not exist)
    /// * `BrokenSymlink` if `path` is a link whose target cannot be read
    fn resolve(&self, path: &Path) -> Result<RealEntry, MansyncError>;
}

/// Resolver for the host platform
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformResolver;

impl ResolveEntry for PlatformResolver {
    fn resolve(&self, path: &Path) -> Result<RealEntry, MansyncError> {
        let metadata = fs::symlink_metadata(path)?;
        if !metadata.file_type().is_symlink() {
            return Ok(RealEntry::from_metadata(&metadata, false));
        }

        let broken = |_: std::io::Error| MansyncError::BrokenSymlink {
            path: path.to_path_buf(),
        };
        let target = platform::link_target(path).map_err(broken)?;
        let target_metadata = fs::metadata(&target).map_err(broken)?;

        Ok(RealEntry::from_metadata(&target_metadata, true))
    }
}

/// Resolve `path` with the host platform's resolver
pub fn resolve_real_entry(path: &Path) -> Result<RealEntry, MansyncError> {
    PlatformResolver.resolve(path)
}

#[cfg(not(windows))]
mod platform {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Read the link once; relative targets are anchored at the link's directory.
    pub(super) fn link_target(path: &Path) -> io::Result<PathBuf> {
        let target = fs::read_link(path)?;
        if target.is_absolute() {
            return Ok(target);
        }
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(base.join(target))
    }
}

#[cfg(windows)]
mod platform {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Final path of the link target (GetFinalPathNameByHandle)
    pub(super) fn link_target(path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}
