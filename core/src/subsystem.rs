//! Read-only world view and the narrow seams between components.
//!
//! RULE: Components never hold references to each other. Anything a
//! component needs from elsewhere arrives either through a `WorldView`
//! borrowed for one computation, or through one of the small traits
//! below. Mutation is sequenced by the engine.

use crate::{
    building_subsystem::BuildingRegistry,
    config::ColonyConfig,
    hot_spring_subsystem::HotSpringSimulator,
    prestige_subsystem::PrestigeLedger,
    research_subsystem::ResearchTree,
    resource_subsystem::ResourceLedger,
    season_subsystem::SeasonClock,
    visitor_subsystem::VisitorSpawner,
    workforce_subsystem::WorkforceAllocator,
};

/// Owned-building counts, as seen by visitor eligibility and scoring.
pub trait BuildingCensus {
    fn count(&self, id: &str) -> u32;
}

/// Immutable snapshot of every component for one derived computation.
#[derive(Clone, Copy)]
pub struct WorldView<'a> {
    pub config:    &'a ColonyConfig,
    pub resources: &'a ResourceLedger,
    pub seasons:   &'a SeasonClock,
    pub springs:   &'a HotSpringSimulator,
    pub workforce: &'a WorkforceAllocator,
    pub buildings: &'a BuildingRegistry,
    pub research:  &'a ResearchTree,
    pub visitors:  &'a VisitorSpawner,
    pub prestige:  &'a PrestigeLedger,
}
