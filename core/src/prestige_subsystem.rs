//! PrestigeLedger: cross-run scoring, permanent upgrades and the
//! migration latch.
//!
//! RULES:
//!   - Legacy points only decrease by purchase. Migration count only
//!     increases. Purchases are latches.
//!   - Bonuses are recomputed from scratch over purchased upgrades in
//!     catalog order: additive ones sum, multiplicative ones multiply,
//!     start-state ones take the last value seen, start technologies
//!     accumulate.
//!   - The migration unlock is per run and cleared by every migration.
//!
//! The reset itself is sequenced by the engine (`SimEngine::migrate`).

use crate::{
    config::{ColonyConfig, UpgradeEffect},
    subsystem::BuildingCensus,
    types::{TechId, UpgradeId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrestigeBonuses {
    pub gathering_bonus:   f64,
    pub spring_discovery:  f64,
    pub visitor_rate:      f64,
    pub science_bonus:     f64,
    pub building_discount: f64,
    pub start_warmth:      f64,
    pub start_population:  u32,
    pub start_resources:   f64,
    pub start_research:    Vec<TechId>,
}

impl PrestigeBonuses {
    pub fn baseline(config: &ColonyConfig) -> Self {
        Self {
            gathering_bonus:   0.0,
            spring_discovery:  1.0,
            visitor_rate:      1.0,
            science_bonus:     0.0,
            building_discount: 0.0,
            start_warmth:      config.prestige.default_start_warmth,
            start_population:  config.workforce.start_adults,
            start_resources:   0.0,
            start_research:    Vec::new(),
        }
    }
}

/// Counts the legacy formula reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyInputs {
    pub population:          u32,
    pub building_count:      u32,
    pub researched_count:    u32,
    pub encountered_species: u32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LegacyLineItem {
    pub name:   String,
    pub value:  u64,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LegacyPoints {
    pub total:     u64,
    pub breakdown: Vec<LegacyLineItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UpgradeListing {
    pub id:         UpgradeId,
    pub name:       String,
    pub cost:       u64,
    pub purchased:  bool,
    pub affordable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrestigeLedger {
    legacy_points:      u64,
    migration_count:    u32,
    migration_unlocked: bool,
    purchased:          BTreeSet<UpgradeId>,
    bonuses:            PrestigeBonuses,
}

impl PrestigeLedger {
    pub fn new(config: &ColonyConfig) -> Self {
        Self {
            legacy_points:      0,
            migration_count:    0,
            migration_unlocked: false,
            purchased:          BTreeSet::new(),
            bonuses:            PrestigeBonuses::baseline(config),
        }
    }

    pub fn legacy_points(&self) -> u64 { self.legacy_points }
    pub fn migration_count(&self) -> u32 { self.migration_count }
    pub fn is_migration_unlocked(&self) -> bool { self.migration_unlocked }
    pub fn bonuses(&self) -> &PrestigeBonuses { &self.bonuses }
    pub fn purchased(&self) -> &BTreeSet<UpgradeId> { &self.purchased }

    pub fn is_purchased(&self, id: &str) -> bool {
        self.purchased.contains(id)
    }

    /// Returns true the first time in a run.
    pub fn unlock_migration(&mut self) -> bool {
        let was = self.migration_unlocked;
        self.migration_unlocked = true;
        !was
    }

    pub fn calculate_legacy_points(
        &self,
        config: &ColonyConfig,
        inputs: &LegacyInputs,
        census: &dyn BuildingCensus,
    ) -> LegacyPoints {
        let mut breakdown = Vec::new();
        let mut push = |name: &str, value: u64, detail: String| {
            if value > 0 {
                breakdown.push(LegacyLineItem { name: name.to_string(), value, detail });
            }
        };

        push("Population", (inputs.population / 10) as u64,
            format!("{} capybaras", inputs.population));
        push("Buildings", (inputs.building_count / 5) as u64,
            format!("{} buildings", inputs.building_count));
        push("Research", inputs.researched_count as u64 * 2,
            format!("{} technologies", inputs.researched_count));
        push("Visitors", inputs.encountered_species as u64 * 3,
            format!("{} species", inputs.encountered_species));
        for milestone in &config.prestige.milestones {
            if census.count(&milestone.building) > 0 {
                push(&milestone.label, milestone.points, format!("Built {}", milestone.label));
            }
        }
        push("Veteran Migrators", self.migration_count as u64 * 2,
            format!("{} previous migrations", self.migration_count));

        let total = breakdown.iter().map(|item| item.value).sum();
        LegacyPoints { total, breakdown }
    }

    pub fn purchase_upgrade(&mut self, config: &ColonyConfig, id: &str) -> bool {
        let Some(upgrade) = config.prestige.upgrades.iter().find(|u| u.id == id) else {
            return false;
        };
        if self.is_purchased(id) || self.legacy_points < upgrade.cost {
            return false;
        }
        self.legacy_points -= upgrade.cost;
        self.purchased.insert(upgrade.id.clone());
        self.recalculate_bonuses(config);
        true
    }

    pub fn recalculate_bonuses(&mut self, config: &ColonyConfig) {
        let mut bonuses = PrestigeBonuses::baseline(config);
        for upgrade in config.prestige.upgrades.iter().filter(|u| self.purchased.contains(&u.id)) {
            match &upgrade.effect {
                UpgradeEffect::GatheringBonus(v)   => bonuses.gathering_bonus += v,
                UpgradeEffect::ScienceBonus(v)     => bonuses.science_bonus += v,
                UpgradeEffect::BuildingDiscount(v) => bonuses.building_discount += v,
                UpgradeEffect::SpringDiscovery(v)  => bonuses.spring_discovery *= v,
                UpgradeEffect::VisitorRate(v)      => bonuses.visitor_rate *= v,
                UpgradeEffect::StartWarmth(v)      => bonuses.start_warmth = *v,
                UpgradeEffect::StartPopulation(v)  => bonuses.start_population = *v,
                UpgradeEffect::StartResources(v)   => bonuses.start_resources = *v,
                UpgradeEffect::StartResearch(t)    => {
                    if !bonuses.start_research.contains(t) {
                        bonuses.start_research.push(t.clone());
                    }
                }
            }
        }
        self.bonuses = bonuses;
    }

    /// Bank a migration: add points, bump the count, clear the latch.
    pub fn bank(&mut self, points: u64) {
        self.legacy_points += points;
        self.migration_count += 1;
        self.migration_unlocked = false;
    }

    pub fn listings(&self, config: &ColonyConfig) -> Vec<UpgradeListing> {
        config
            .prestige
            .upgrades
            .iter()
            .map(|u| UpgradeListing {
                id:         u.id.clone(),
                name:       u.name.clone(),
                cost:       u.cost,
                purchased:  self.is_purchased(&u.id),
                affordable: self.legacy_points >= u.cost,
            })
            .collect()
    }

    pub(crate) fn unknown_ids<'a>(&'a self, config: &ColonyConfig) -> Vec<&'a str> {
        self.purchased
            .iter()
            .filter(|id| !config.prestige.upgrades.iter().any(|u| &u.id == *id))
            .map(|id| id.as_str())
            .collect()
    }
}
