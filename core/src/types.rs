//! Shared primitive types used across the entire simulation.

use std::collections::BTreeMap;

/// A simulation tick. One tick = 100 ms of nominal game time.
pub type Tick = u64;

/// The canonical run identifier.
pub type RunId = String;

/// Catalog identifiers. All catalogs are configuration-driven, so ids are
/// plain strings (`"grass"`, `"reed_shelter"`, `"spring_keeper"`, ...).
pub type ResourceId = String;
pub type JobId = String;
pub type BuildingId = String;
pub type TechId = String;
pub type SpeciesId = String;
pub type UpgradeId = String;

/// Resource amounts keyed by resource id. Ordered so that every
/// iteration (spending, summing rates) is deterministic.
pub type CostMap = BTreeMap<ResourceId, f64>;

/// Generate a fresh run identifier.
pub fn new_run_id() -> RunId {
    format!("run-{}", uuid::Uuid::new_v4())
}
