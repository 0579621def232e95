//! Diff engine - Manifest comparison and plan generation

mod engine;
mod index;
mod plan;

pub use engine::diff_manifests;
pub use plan::{generate_repair_plan, generate_sync_plan, PlanStats, SyncPlan};
