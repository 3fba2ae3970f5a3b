//! VisitorSpawner: transient bonus-granting animals gated by which
//! buildings the colony owns.
//!
//! RULES:
//!   - A species is eligible when absent and at least one of its
//!     attracting buildings is owned.
//!   - Spawn weight is 5 − rarity.
//!   - Bonus magnitudes are scaled by the research visitor-bonus
//!     multiplier at the point of use, never at spawn, so later research
//!     affects visitors already present. The night bonus is unscaled.
//!
//! Execution: step 6 of the colony tick (timers, then the arrival roll
//! resolved from the season gate).

use crate::{
    config::{ColonyConfig, VisitorBonus, VisitorDef},
    rng::SubsystemRng,
    subsystem::BuildingCensus,
    types::{SpeciesId, Tick},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visitor {
    pub species:   SpeciesId,
    pub remaining: Tick,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisitorSpawner {
    current:     Vec<Visitor>,
    encountered: BTreeSet<SpeciesId>,
}

impl VisitorSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &[Visitor] {
        &self.current
    }

    pub fn encountered(&self) -> &BTreeSet<SpeciesId> {
        &self.encountered
    }

    pub fn encountered_count(&self) -> usize {
        self.encountered.len()
    }

    pub fn is_present(&self, species: &str) -> bool {
        self.current.iter().any(|v| v.species == species)
    }

    fn present_defs<'c>(&'c self, config: &'c ColonyConfig) -> impl Iterator<Item = &'c VisitorDef> + 'c {
        self.current
            .iter()
            .filter_map(move |v| config.visitors.iter().find(|d| d.id == v.species))
    }

    pub fn can_spawn(&self, config: &ColonyConfig, species: &str, census: &dyn BuildingCensus) -> bool {
        let Some(def) = config.visitors.iter().find(|d| d.id == species) else {
            return false;
        };
        !self.is_present(species) && def.attracted_by.iter().any(|b| census.count(b) > 0)
    }

    /// Weighted draw over eligible species. Returns the arrival.
    pub fn try_spawn(
        &mut self,
        config: &ColonyConfig,
        census: &dyn BuildingCensus,
        duration_multiplier: f64,
        rng: &mut SubsystemRng,
    ) -> Option<Visitor> {
        let mut pool: Vec<&str> = Vec::new();
        for def in &config.visitors {
            if self.can_spawn(config, &def.id, census) {
                let weight = 5u8.saturating_sub(def.rarity);
                for _ in 0..weight {
                    pool.push(&def.id);
                }
            }
        }
        if pool.is_empty() {
            return None;
        }
        let pick = pool[rng.next_u64_below(pool.len() as u64) as usize].to_string();
        self.spawn(config, &pick, duration_multiplier)
    }

    /// Arrive unconditionally (except when already present).
    pub fn spawn(&mut self, config: &ColonyConfig, species: &str, duration_multiplier: f64) -> Option<Visitor> {
        let def = config.visitors.iter().find(|d| d.id == species)?;
        if self.is_present(species) {
            return None;
        }
        let visitor = Visitor {
            species:   def.id.clone(),
            remaining: ((def.stay_duration as f64 * duration_multiplier).floor() as Tick).max(1),
        };
        self.current.push(visitor.clone());
        self.encountered.insert(def.id.clone());
        Some(visitor)
    }

    /// Count every visitor down. Returns the species that departed.
    pub fn tick(&mut self) -> Vec<SpeciesId> {
        let mut departed = Vec::new();
        for v in self.current.iter_mut() {
            v.remaining = v.remaining.saturating_sub(1);
            if v.remaining == 0 {
                departed.push(v.species.clone());
            }
        }
        self.current.retain(|v| v.remaining > 0);
        departed
    }

    // ── Bonus queries ──────────────────────────────────────────

    /// Σ flat species happiness × bonus multiplier.
    pub fn happiness_bonus(&self, config: &ColonyConfig, bonus_multiplier: f64) -> f64 {
        self.present_defs(config).map(|d| d.happiness).sum::<f64>() * bonus_multiplier
    }

    /// Happiness-kind bonuses × bonus multiplier.
    pub fn extra_happiness(&self, config: &ColonyConfig, bonus_multiplier: f64) -> f64 {
        self.present_defs(config)
            .filter_map(|d| match d.bonus {
                VisitorBonus::Happiness { amount } => Some(amount * bonus_multiplier),
                _ => None,
            })
            .sum()
    }

    /// 1 + Σ matching production addends × bonus multiplier.
    pub fn production_multiplier(&self, config: &ColonyConfig, resource: &str, bonus_multiplier: f64) -> f64 {
        1.0 + self
            .present_defs(config)
            .filter_map(|d| match &d.bonus {
                VisitorBonus::Production { resource: r, amount } if r == resource => Some(*amount),
                VisitorBonus::AllProduction { amount } => Some(*amount),
                _ => None,
            })
            .map(|amount| amount * bonus_multiplier)
            .sum::<f64>()
    }

    pub fn storage_multiplier(&self, config: &ColonyConfig, bonus_multiplier: f64) -> f64 {
        1.0 + self
            .present_defs(config)
            .filter_map(|d| match d.bonus {
                VisitorBonus::StorageBonus { amount } => Some(amount * bonus_multiplier),
                _ => None,
            })
            .sum::<f64>()
    }

    /// 1 + amount of the first night-bonus visitor, while night.
    pub fn night_bonus(&self, config: &ColonyConfig, night: bool) -> f64 {
        if !night {
            return 1.0;
        }
        self.present_defs(config)
            .find_map(|d| match d.bonus {
                VisitorBonus::NightBonus { amount } => Some(1.0 + amount),
                _ => None,
            })
            .unwrap_or(1.0)
    }

    pub fn has_forecaster(&self, config: &ColonyConfig) -> bool {
        self.present_defs(config)
            .any(|d| matches!(d.bonus, VisitorBonus::WeatherForecast))
    }

    pub(crate) fn unknown_ids<'a>(&'a self, config: &ColonyConfig) -> Vec<&'a str> {
        self.current
            .iter()
            .map(|v| &v.species)
            .chain(self.encountered.iter())
            .filter(|id| !config.visitors.iter().any(|d| &d.id == *id))
            .map(|id| id.as_str())
            .collect()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        let distinct: BTreeSet<&str> = self.current.iter().map(|v| v.species.as_str()).collect();
        distinct.len() == self.current.len()
            && self.current.iter().all(|v| v.remaining > 0 && self.encountered.contains(&v.species))
    }
}
