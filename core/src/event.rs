//! Colony events: everything observable that happened during a tick or
//! a player action.
//!
//! RULE: Events are outputs only. Components never react to events;
//! cross-component effects are sequenced by the engine.

use crate::{
    config::{Feature, SpringType},
    season_subsystem::{Season, Weather},
    types::{BuildingId, JobId, ResourceId, RunId, SpeciesId, TechId, Tick, UpgradeId},
};
use serde::{Deserialize, Serialize};

/// Every event emitted by the simulation.
/// Variants may be appended, never removed or reordered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    // ── Engine events ──────────────────────────────
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    PlayerCommandReceived {
        tick: Tick,
        command_type: String,
        accepted: bool,
    },

    // ── Season events ──────────────────────────────
    DayStarted {
        tick: Tick,
        day: u64,
    },
    NightFell {
        tick: Tick,
        day: u64,
    },
    WeatherChanged {
        tick: Tick,
        weather: Weather,
    },
    SeasonChanged {
        tick: Tick,
        season: Season,
        happiness_modifier: f64,
    },

    // ── Hot spring events ──────────────────────────
    SpringDiscovered {
        tick: Tick,
        spring_type: SpringType,
    },

    // ── Visitor events ─────────────────────────────
    VisitorArrived {
        tick: Tick,
        species: SpeciesId,
        duration: Tick,
    },
    VisitorDeparted {
        tick: Tick,
        species: SpeciesId,
    },

    // ── Workforce events ───────────────────────────
    PupBorn {
        tick: Tick,
        pups: u32,
    },
    PupMatured {
        tick: Tick,
        adults: u32,
    },

    // ── Player progress events ─────────────────────
    BuildingConstructed {
        tick: Tick,
        building: BuildingId,
        count: u32,
    },
    TechResearched {
        tick: Tick,
        tech: TechId,
    },
    JobUnlocked {
        tick: Tick,
        job: JobId,
    },
    ResourceUnlocked {
        tick: Tick,
        resource: ResourceId,
    },
    FeatureUnlocked {
        tick: Tick,
        feature: Feature,
    },
    UpgradePurchased {
        tick: Tick,
        upgrade: UpgradeId,
        remaining_points: u64,
    },
    Migrated {
        tick: Tick,
        points_earned: u64,
        migration_count: u32,
    },
}

impl SimEvent {
    /// Stable name used for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }        => "run_initialized",
            SimEvent::PlayerCommandReceived { .. } => "player_command_received",
            SimEvent::DayStarted { .. }            => "day_started",
            SimEvent::NightFell { .. }             => "night_fell",
            SimEvent::WeatherChanged { .. }        => "weather_changed",
            SimEvent::SeasonChanged { .. }         => "season_changed",
            SimEvent::SpringDiscovered { .. }      => "spring_discovered",
            SimEvent::VisitorArrived { .. }        => "visitor_arrived",
            SimEvent::VisitorDeparted { .. }       => "visitor_departed",
            SimEvent::PupBorn { .. }               => "pup_born",
            SimEvent::PupMatured { .. }            => "pup_matured",
            SimEvent::BuildingConstructed { .. }   => "building_constructed",
            SimEvent::TechResearched { .. }        => "tech_researched",
            SimEvent::JobUnlocked { .. }           => "job_unlocked",
            SimEvent::ResourceUnlocked { .. }      => "resource_unlocked",
            SimEvent::FeatureUnlocked { .. }       => "feature_unlocked",
            SimEvent::UpgradePurchased { .. }      => "upgrade_purchased",
            SimEvent::Migrated { .. }              => "migrated",
        }
    }

    /// Component the event originates from, for the subsystem column.
    pub fn source(&self) -> &'static str {
        match self {
            SimEvent::RunInitialized { .. }
            | SimEvent::PlayerCommandReceived { .. } => "engine",
            SimEvent::DayStarted { .. }
            | SimEvent::NightFell { .. }
            | SimEvent::WeatherChanged { .. }
            | SimEvent::SeasonChanged { .. }         => "season",
            SimEvent::SpringDiscovered { .. }        => "hot_spring",
            SimEvent::VisitorArrived { .. }
            | SimEvent::VisitorDeparted { .. }       => "visitor",
            SimEvent::PupBorn { .. }
            | SimEvent::PupMatured { .. }
            | SimEvent::JobUnlocked { .. }           => "workforce",
            SimEvent::BuildingConstructed { .. }
            | SimEvent::FeatureUnlocked { .. }       => "building",
            SimEvent::ResourceUnlocked { .. }        => "resource",
            SimEvent::TechResearched { .. }          => "research",
            SimEvent::UpgradePurchased { .. }
            | SimEvent::Migrated { .. }              => "prestige",
        }
    }
}

/// An event as persisted in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub tick:       Tick,
    pub subsystem:  String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized SimEvent
}
