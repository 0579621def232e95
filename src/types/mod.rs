//! Core type definitions for mansync

mod action;
mod entry;
mod error;
mod manifest;
mod state;

pub use action::SyncAction;
pub use entry::{ManifestEntry, PATH_SEPARATOR};
pub use error::MansyncError;
pub use manifest::Manifest;
pub use state::{DiffSummary, ManifestDiff, ManifestState};
