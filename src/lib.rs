//! # mansync - Directory manifests with move-aware sync
//!
//! Records a directory tree as a manifest of `(path, size, checksum)`
//! entries, detects moves, edits, additions and removals between two
//! manifests, verifies a tree against its manifest, and brings a target
//! tree in line with a source manifest by renaming in place where it can.
//!
//! The engine never prints; it reports through return values and
//! `tracing` events. The `commands` module is the CLI front-end.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod hash;
pub mod manifest;
pub mod resolve;
pub mod scanner;
pub mod types;
pub mod verify;

// Re-export commonly used types
pub use config::Config;
pub use diff::diff_manifests;
pub use executor::apply;
pub use manifest::{load_manifest, save_manifest, MANIFEST_FILE_NAME};
pub use scanner::scan_directory;
pub use types::{Manifest, ManifestDiff, ManifestEntry, ManifestState, MansyncError};
pub use verify::verify_directory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
