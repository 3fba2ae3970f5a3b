//! BuildingRegistry: purchasable structures: unlock graph, scaling
//! cost and owned counts.
//!
//! RULES:
//!   - Unlock is a latch. It flips the first time a query finds every
//!     prerequisite satisfied and never reverts.
//!   - Cost at owned count k is ceil(base × growth^k) per resource, then
//!     ceil(· × (1 − discount)) when a discount is active.
//!   - Discoverable buildings are never purchasable.
//!
//! The registry owns counts and latches only. The engine applies the
//! effect set of a freshly built structure to the other components.

use crate::{
    config::{BuildingCategory, BuildingDef, ColonyConfig, Feature},
    resource_subsystem::ResourceLedger,
    subsystem::BuildingCensus,
    types::{BuildingId, CostMap},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BuildingListing {
    pub id:         BuildingId,
    pub name:       String,
    pub tier:       u8,
    pub category:   BuildingCategory,
    pub count:      u32,
    pub max_count:  Option<u32>,
    pub cost:       CostMap,
    pub unlocked:   bool,
    pub affordable: bool,
    pub at_max:     bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildingRegistry {
    counts:   BTreeMap<BuildingId, u32>,
    unlocked: BTreeSet<BuildingId>,
    features: BTreeSet<Feature>,
}

impl BuildingRegistry {
    pub fn new(config: &ColonyConfig) -> Self {
        Self {
            counts:   config.buildings.iter().map(|b| (b.id.clone(), 0)).collect(),
            unlocked: config
                .buildings
                .iter()
                .filter(|b| b.unlocked_by_default)
                .map(|b| b.id.clone())
                .collect(),
            features: BTreeSet::new(),
        }
    }

    pub fn count(&self, id: &str) -> u32 {
        self.counts.get(id).copied().unwrap_or(0)
    }

    pub fn total_count(&self) -> u32 {
        self.counts.values().sum()
    }

    pub fn counts(&self) -> &BTreeMap<BuildingId, u32> {
        &self.counts
    }

    /// A building with no requirements never unlocks through this path.
    /// Starters are latched at construction and discoverables on discovery.
    pub fn prerequisites_met(&self, config: &ColonyConfig, id: &str) -> bool {
        config
            .building(id)
            .filter(|def| !def.requires.is_empty())
            .is_some_and(|def| def.requires.iter().all(|(req, n)| self.count(req) >= *n))
    }

    /// Latched flag only; no evaluation.
    pub fn is_latched(&self, id: &str) -> bool {
        self.unlocked.contains(id)
    }

    /// Unlocked now, or would latch on the next query.
    pub fn is_available(&self, config: &ColonyConfig, id: &str) -> bool {
        self.is_latched(id) || self.prerequisites_met(config, id)
    }

    /// Evaluate the prerequisite latch, flipping it when satisfied.
    pub fn is_unlocked(&mut self, config: &ColonyConfig, id: &str) -> bool {
        if self.is_latched(id) {
            return true;
        }
        if self.prerequisites_met(config, id) {
            self.unlocked.insert(id.to_string());
            return true;
        }
        false
    }

    /// Re-evaluate every latch. Returns newly unlocked ids.
    pub fn refresh_unlocks(&mut self, config: &ColonyConfig) -> Vec<BuildingId> {
        let mut newly = Vec::new();
        for def in &config.buildings {
            if !self.is_latched(&def.id) && self.is_unlocked(config, &def.id) {
                newly.push(def.id.clone());
            }
        }
        newly
    }

    pub fn cost(&self, config: &ColonyConfig, id: &str, discount: f64) -> CostMap {
        let Some(def) = config.building(id) else {
            return CostMap::new();
        };
        let owned = self.count(id) as i32;
        def.cost
            .iter()
            .map(|(res, base)| {
                let mut amount = (base * def.cost_growth.powi(owned)).ceil();
                if discount > 0.0 {
                    amount = (amount * (1.0 - discount)).ceil();
                }
                (res.clone(), amount)
            })
            .collect()
    }

    fn at_max(&self, def: &BuildingDef) -> bool {
        def.max_count.is_some_and(|max| self.count(&def.id) >= max)
    }

    /// Read-only purchase check.
    pub fn can_build(
        &self,
        config: &ColonyConfig,
        id: &str,
        ledger: &ResourceLedger,
        discount: f64,
    ) -> bool {
        let Some(def) = config.building(id) else {
            return false;
        };
        !def.discoverable
            && self.is_available(config, id)
            && !self.at_max(def)
            && ledger.can_afford(&self.cost(config, id, discount))
    }

    /// Spend the cost and increment the count. Effects are the caller's.
    pub fn build<'c>(
        &mut self,
        config: &'c ColonyConfig,
        id: &str,
        ledger: &mut ResourceLedger,
        discount: f64,
    ) -> Option<&'c BuildingDef> {
        let def = config.building(id)?;
        if def.discoverable || !self.is_unlocked(config, id) || self.at_max(def) {
            return None;
        }
        let cost = self.cost(config, id, discount);
        if !ledger.spend(&cost) {
            return None;
        }
        *self.counts.entry(def.id.clone()).or_insert(0) += 1;
        Some(def)
    }

    /// Event-driven appearance of a discoverable building (0 → 1).
    pub fn discover<'c>(&mut self, config: &'c ColonyConfig, id: &str) -> Option<&'c BuildingDef> {
        let def = config.building(id)?;
        if !def.discoverable || self.count(id) > 0 {
            return None;
        }
        self.counts.insert(def.id.clone(), 1);
        self.unlocked.insert(def.id.clone());
        Some(def)
    }

    /// base + Σ housing × count.
    pub fn total_housing(&self, config: &ColonyConfig, base: u32) -> u32 {
        base + config
            .buildings
            .iter()
            .map(|b| b.effects.housing * self.count(&b.id))
            .sum::<u32>()
    }

    /// Product of the science multipliers of every owned building type.
    pub fn science_multiplier(&self, config: &ColonyConfig) -> f64 {
        config
            .buildings
            .iter()
            .filter(|b| self.count(&b.id) > 0)
            .filter_map(|b| b.effects.science_multiplier)
            .product()
    }

    pub fn unlock_feature(&mut self, feature: Feature) -> bool {
        self.features.insert(feature)
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(&feature)
    }

    /// Display rows: undiscovered discoverables and locked tiers above 2
    /// are hidden; unlocked first, then by tier.
    pub fn listings(
        &self,
        config: &ColonyConfig,
        ledger: &ResourceLedger,
        discount: f64,
    ) -> Vec<BuildingListing> {
        let mut rows: Vec<BuildingListing> = config
            .buildings
            .iter()
            .filter(|def| !(def.discoverable && self.count(&def.id) == 0))
            .filter_map(|def| {
                let unlocked = self.is_available(config, &def.id);
                if !unlocked && def.tier > 2 {
                    return None;
                }
                let cost = self.cost(config, &def.id, discount);
                Some(BuildingListing {
                    id:         def.id.clone(),
                    name:       def.name.clone(),
                    tier:       def.tier,
                    category:   def.category,
                    count:      self.count(&def.id),
                    max_count:  def.max_count,
                    affordable: ledger.can_afford(&cost),
                    cost,
                    unlocked,
                    at_max:     self.at_max(def),
                })
            })
            .collect();
        rows.sort_by_key(|row| (!row.unlocked, row.tier));
        rows
    }

    pub(crate) fn unknown_ids<'a>(&'a self, config: &ColonyConfig) -> Vec<&'a str> {
        self.counts
            .keys()
            .chain(self.unlocked.iter())
            .filter(|id| config.building(id).is_none())
            .map(|id| id.as_str())
            .collect()
    }
}

impl BuildingCensus for BuildingRegistry {
    fn count(&self, id: &str) -> u32 {
        BuildingRegistry::count(self, id)
    }
}
