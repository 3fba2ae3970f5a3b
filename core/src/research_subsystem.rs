//! ResearchTree: technology DAG with prerequisite gating and stacking
//! bonuses.
//!
//! Additive effects sum; multiplicative effects multiply the running
//! value. Storage deltas go straight to the ledger's base capacity.
//! Research is gated by prerequisites and cost; the council feature flag
//! is informational.

use crate::{
    config::{ColonyConfig, ResearchBranch, TechEffects},
    resource_subsystem::ResourceLedger,
    types::{CostMap, ResourceId, TechId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResearchBonuses {
    pub production_bonus:    BTreeMap<ResourceId, f64>,
    pub storage:             BTreeMap<ResourceId, f64>,
    pub storage_multiplier:  f64,
    pub spring_capacity:     u32,
    pub warmth_bonus:        f64,
    pub spring_happiness:    f64,
    pub relaxation_duration: f64,
    pub base_happiness:      f64,
    pub visitor_duration:    f64,
    pub visitor_bonus:       f64,
    pub science_bonus:       f64,
    pub spring_discovery:    f64,
}

impl Default for ResearchBonuses {
    fn default() -> Self {
        Self {
            production_bonus:    BTreeMap::new(),
            storage:             BTreeMap::new(),
            storage_multiplier:  0.0,
            spring_capacity:     0,
            warmth_bonus:        0.0,
            spring_happiness:    0.0,
            relaxation_duration: 1.0,
            base_happiness:      0.0,
            visitor_duration:    1.0,
            visitor_bonus:       1.0,
            science_bonus:       0.0,
            spring_discovery:    1.0,
        }
    }
}

impl ResearchBonuses {
    fn apply(&mut self, effects: &TechEffects) {
        for (res, bonus) in &effects.production_bonus {
            *self.production_bonus.entry(res.clone()).or_insert(0.0) += bonus;
        }
        for (res, delta) in &effects.storage {
            *self.storage.entry(res.clone()).or_insert(0.0) += delta;
        }
        self.storage_multiplier += effects.storage_multiplier;
        self.spring_capacity    += effects.spring_capacity;
        self.warmth_bonus       += effects.warmth_bonus;
        self.spring_happiness   += effects.spring_happiness;
        self.base_happiness     += effects.base_happiness;
        self.science_bonus      += effects.science_bonus;
        if let Some(m) = effects.relaxation_duration { self.relaxation_duration *= m; }
        if let Some(m) = effects.visitor_duration    { self.visitor_duration    *= m; }
        if let Some(m) = effects.visitor_bonus       { self.visitor_bonus       *= m; }
        if let Some(m) = effects.spring_discovery    { self.spring_discovery    *= m; }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TechListing {
    pub id:         TechId,
    pub name:       String,
    pub branch:     ResearchBranch,
    pub cost:       CostMap,
    pub researched: bool,
    /// Prerequisites met and not yet researched.
    pub available:  bool,
    pub affordable: bool,
    pub locked:     bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResearchTree {
    unlocked:   bool,
    researched: BTreeSet<TechId>,
    bonuses:    ResearchBonuses,
}

impl ResearchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bonuses(&self) -> &ResearchBonuses {
        &self.bonuses
    }

    pub fn production_bonus(&self, resource: &str) -> f64 {
        self.bonuses.production_bonus.get(resource).copied().unwrap_or(0.0)
    }

    pub fn is_researched(&self, id: &str) -> bool {
        self.researched.contains(id)
    }

    pub fn researched(&self) -> &BTreeSet<TechId> {
        &self.researched
    }

    pub fn researched_count(&self) -> usize {
        self.researched.len()
    }

    /// Returns true the first time.
    pub fn unlock(&mut self) -> bool {
        let was = self.unlocked;
        self.unlocked = true;
        !was
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn prerequisites_met(&self, config: &ColonyConfig, id: &str) -> bool {
        config
            .technology(id)
            .map(|t| t.requires.iter().all(|r| self.is_researched(r)))
            .unwrap_or(false)
    }

    pub fn can_research(&self, config: &ColonyConfig, id: &str, ledger: &ResourceLedger) -> bool {
        let Some(tech) = config.technology(id) else {
            return false;
        };
        !self.is_researched(id)
            && self.prerequisites_met(config, id)
            && ledger.can_afford(&tech.cost)
    }

    /// Spend, latch and apply.
    pub fn research(&mut self, config: &ColonyConfig, id: &str, ledger: &mut ResourceLedger) -> bool {
        if !self.can_research(config, id, ledger) {
            return false;
        }
        let Some(tech) = config.technology(id) else {
            return false;
        };
        if !ledger.spend(&tech.cost) {
            return false;
        }
        self.researched.insert(tech.id.clone());
        self.apply_effects(&tech.effects, ledger);
        log::info!("researched {}", tech.id);
        true
    }

    /// Latch and apply without cost or prerequisite checks.
    pub fn grant(&mut self, config: &ColonyConfig, id: &str, ledger: &mut ResourceLedger) -> bool {
        let Some(tech) = config.technology(id) else {
            return false;
        };
        if !self.researched.insert(tech.id.clone()) {
            return false;
        }
        self.apply_effects(&tech.effects, ledger);
        true
    }

    fn apply_effects(&mut self, effects: &TechEffects, ledger: &mut ResourceLedger) {
        for (res, delta) in &effects.storage {
            ledger.add_capacity(res, *delta);
        }
        self.bonuses.apply(effects);
    }

    /// Display rows for one branch in catalog order.
    pub fn listings(
        &self,
        config: &ColonyConfig,
        branch: ResearchBranch,
        ledger: &ResourceLedger,
    ) -> Vec<TechListing> {
        config
            .technologies
            .iter()
            .filter(|t| t.branch == branch)
            .map(|t| {
                let researched = self.is_researched(&t.id);
                let met = self.prerequisites_met(config, &t.id);
                TechListing {
                    id:         t.id.clone(),
                    name:       t.name.clone(),
                    branch:     t.branch,
                    cost:       t.cost.clone(),
                    researched,
                    available:  met && !researched,
                    affordable: ledger.can_afford(&t.cost),
                    locked:     !met && !researched,
                }
            })
            .collect()
    }

    pub(crate) fn unknown_ids<'a>(&'a self, config: &ColonyConfig) -> Vec<&'a str> {
        self.researched
            .iter()
            .filter(|id| config.technology(id).is_none())
            .map(|id| id.as_str())
            .collect()
    }
}
