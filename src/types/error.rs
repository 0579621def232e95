//! Error types for mansync

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for mansync operations
#[derive(Debug, Error)]
pub enum MansyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Scan root does not exist
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Symlink whose target cannot be read
    #[error("Broken symlink: {path}")]
    BrokenSymlink { path: PathBuf },

    /// Manifest line with the wrong field count or an unparsable size
    #[error("Malformed manifest line {line}: {reason}")]
    MalformedManifestLine { line: usize, reason: String },

    /// Absolute path or parent traversal in a manifest entry
    #[error("Invalid manifest path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MansyncError {
    /// Check if this error means "the file is not there"
    ///
    /// Broken symlinks count as absent files, and so does a path whose
    /// parent has been replaced by a regular file.
    pub fn is_not_found(&self) -> bool {
        match self {
            MansyncError::BrokenSymlink { .. } | MansyncError::DirectoryNotFound { .. } => true,
            MansyncError::Io(e) => matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory),
            _ => false,
        }
    }

    /// Check if this error comes from reading a manifest
    pub fn is_manifest_error(&self) -> bool {
        matches!(
            self,
            MansyncError::MalformedManifestLine { .. } | MansyncError::InvalidPath { .. }
        )
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, MansyncError::Config(_) | MansyncError::InvalidPath { .. })
    }
}
