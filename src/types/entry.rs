//! ManifestEntry - One tracked file in a manifest

use super::MansyncError;
use serde::Serialize;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Separator used in manifest paths on every platform
pub const PATH_SEPARATOR: char = '/';

/// A tracked file: relative path, size in bytes, content checksum.
///
/// Equality is structural: path and size must match exactly, checksums are
/// compared ignoring ASCII case. `Hash` is consistent with that.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    path: String,
    size: u64,
    checksum: String,
}

impl ManifestEntry {
    /// Create a new entry, normalizing `\` separators to `/`.
    ///
    /// # Errors
    /// `InvalidPath` if the path is empty, absolute, contains a `..` segment,
    /// or contains a tab or line break.
    pub fn new(
        path: impl Into<String>,
        size: u64,
        checksum: impl Into<String>,
    ) -> Result<Self, MansyncError> {
        let mut path = path.into();
        if path.contains('\\') {
            path = path.replace('\\', "/");
        }
        validate_relative_path(&path)?;

        Ok(Self {
            path,
            size,
            checksum: checksum.into(),
        })
    }

    /// Same path, with size and checksum as observed on disk
    pub(crate) fn observed(&self, size: u64, checksum: impl Into<String>) -> Self {
        Self {
            path: self.path.clone(),
            size,
            checksum: checksum.into(),
        }
    }

    /// Relative path using `/` separators
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Hex checksum (empty when the verifier skipped hashing)
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    /// Case-insensitive checksum comparison
    pub fn checksum_matches(&self, other: &str) -> bool {
        self.checksum.eq_ignore_ascii_case(other)
    }

    /// Lowercase checksum, used as the index key for checksum lookups
    pub fn checksum_key(&self) -> String {
        self.checksum.to_ascii_lowercase()
    }

    /// The entry's location under `root`, in platform-native form
    pub fn native_path(&self, root: &Path) -> PathBuf {
        self.path
            .split(PATH_SEPARATOR)
            .fold(root.to_path_buf(), |acc, segment| acc.join(segment))
    }

    /// Every ancestor directory of this entry, nearest first, e.g. `a/b/c.txt` → `a/b`, `a`
    pub fn parent_dirs(&self) -> impl Iterator<Item = &str> {
        let path = self.path.as_str();
        path.char_indices()
            .filter(|(_, c)| *c == PATH_SEPARATOR)
            .map(move |(idx, _)| &path[..idx])
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
    }
}

impl PartialEq for ManifestEntry {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.size == other.size && self.checksum_matches(&other.checksum)
    }
}

impl Eq for ManifestEntry {}

impl Hash for ManifestEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
        self.size.hash(state);
        for byte in self.checksum.bytes() {
            state.write_u8(byte.to_ascii_lowercase());
        }
    }
}

/// Reject paths that could escape the managed root.
fn validate_relative_path(path: &str) -> Result<(), MansyncError> {
    let invalid = |reason: &str| MansyncError::InvalidPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("empty path"));
    }

    let bytes = path.as_bytes();
    let has_drive_prefix = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with(PATH_SEPARATOR) || has_drive_prefix || Path::new(path).is_absolute() {
        return Err(invalid("absolute paths are not allowed"));
    }

    if path.split(PATH_SEPARATOR).any(|segment| segment == "..") {
        return Err(invalid("parent traversal is not allowed"));
    }

    // Not representable in the line-oriented manifest format
    if path.contains(['\t', '\n', '\r']) {
        return Err(invalid("tabs and line breaks are not allowed"));
    }

    Ok(())
}
