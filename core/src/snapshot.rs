//! Snapshot serialization: full colony state to/from JSON.
//!
//! A snapshot carries a version tag, a millisecond timestamp and one
//! sub-object per component. Import validates the whole document before
//! anything is applied; the engine then swaps every component at once.

use crate::{
    building_subsystem::BuildingRegistry,
    clock::SimClock,
    config::ColonyConfig,
    error::{SimError, SimResult},
    hot_spring_subsystem::HotSpringSimulator,
    prestige_subsystem::PrestigeLedger,
    research_subsystem::ResearchTree,
    resource_subsystem::ResourceLedger,
    season_subsystem::SeasonClock,
    types::{RunId, Tick},
    visitor_subsystem::VisitorSpawner,
    workforce_subsystem::WorkforceAllocator,
};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Autosave cadence when a store is attached (one in-game day).
pub const AUTOSAVE_INTERVAL: Tick = 600;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColonySnapshot {
    pub version:     u32,
    /// Unix milliseconds at capture.
    pub timestamp:   i64,
    pub run_id:      RunId,
    pub seed:        u64,
    pub clock:       SimClock,
    pub resources:   ResourceLedger,
    pub buildings:   BuildingRegistry,
    pub population:  WorkforceAllocator,
    pub hot_springs: HotSpringSimulator,
    pub seasons:     SeasonClock,
    pub research:    ResearchTree,
    pub visitors:    VisitorSpawner,
    pub prestige:    PrestigeLedger,
}

impl ColonySnapshot {
    pub fn to_json(&self) -> SimResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse and structurally check a foreign document. Referential
    /// checks need the config and live in `validate`.
    pub fn import_json(json: &str) -> SimResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let Some(object) = value.as_object() else {
            return Err(SimError::invalid_snapshot("document is not an object"));
        };
        let Some(version) = object.get("version") else {
            return Err(SimError::invalid_snapshot("missing version"));
        };
        if !object.contains_key("timestamp") {
            return Err(SimError::invalid_snapshot("missing timestamp"));
        }
        let Some(found) = version.as_u64() else {
            return Err(SimError::invalid_snapshot("version is not an integer"));
        };
        if found != SNAPSHOT_VERSION as u64 {
            return Err(SimError::UnsupportedSnapshotVersion {
                expected: SNAPSHOT_VERSION,
                found,
            });
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Referential integrity and range checks against `config`.
    pub fn validate(&self, config: &ColonyConfig) -> SimResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(SimError::UnsupportedSnapshotVersion {
                expected: SNAPSHOT_VERSION,
                found:    self.version as u64,
            });
        }

        let unknown = [
            ("resource", self.resources.unknown_ids(config)),
            ("building", self.buildings.unknown_ids(config)),
            ("job", self.population.unknown_jobs(config)),
            ("technology", self.research.unknown_ids(config)),
            ("visitor", self.visitors.unknown_ids(config)),
            ("upgrade", self.prestige.unknown_ids(config)),
        ];
        for (kind, ids) in unknown {
            if let Some(id) = ids.first() {
                return Err(SimError::invalid_snapshot(format!("unknown {kind} '{id}'")));
            }
        }

        if !self.resources.stocks_in_range() {
            return Err(SimError::invalid_snapshot("resource amount outside [0, capacity]"));
        }
        if !self.population.is_consistent() {
            return Err(SimError::invalid_snapshot("job assignments exceed adults"));
        }
        if !self.hot_springs.is_consistent(self.research.bonuses().spring_capacity) {
            return Err(SimError::invalid_snapshot("hot spring occupancy is inconsistent"));
        }
        if !self.hot_springs.max_warmth_matches(&config.thermal) {
            return Err(SimError::invalid_snapshot("max warmth does not match the spring count"));
        }
        if !self.seasons.is_consistent(&config.seasons) {
            return Err(SimError::invalid_snapshot("season state is inconsistent"));
        }
        if !self.visitors.is_consistent() {
            return Err(SimError::invalid_snapshot("visitor list is inconsistent"));
        }
        Ok(())
    }
}
