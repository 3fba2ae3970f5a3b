//! ResourceLedger: bounded named stocks with production and
//! consumption rates.
//!
//! RULES:
//!   - Every amount stays in [0, capacity(id)] after every mutation.
//!   - spend() is all-or-nothing.
//!   - tick() adds production and removes consumption independently,
//!     each clamped on its own. The displayed net rate is informational
//!     and may not match the clamped delta at the boundary.
//!   - Unknown ids are neutral: 0 amount, 0 capacity, nothing applied.
//!
//! Execution: step 4 of the colony tick (after rate recomputation).
//! Rates are installed by the engine from a `RateSheet`.

use crate::{
    config::ColonyConfig,
    productivity::RateSheet,
    types::{CostMap, ResourceId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceLedger {
    amounts:            BTreeMap<ResourceId, f64>,
    base_capacity:      BTreeMap<ResourceId, f64>,
    visible:            BTreeSet<ResourceId>,
    production:         BTreeMap<ResourceId, f64>,
    consumption:        BTreeMap<ResourceId, f64>,
    /// visitor storage multiplier × (1 + research storage bonus)
    storage_multiplier: f64,
}

/// One row of the visible-resource display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceRow {
    pub id:       ResourceId,
    pub name:     String,
    pub amount:   f64,
    pub capacity: f64,
    pub net_rate: f64,
}

impl ResourceLedger {
    pub fn new(config: &ColonyConfig) -> Self {
        let mut ledger = Self {
            amounts:            BTreeMap::new(),
            base_capacity:      BTreeMap::new(),
            visible:            BTreeSet::new(),
            production:         BTreeMap::new(),
            consumption:        BTreeMap::new(),
            storage_multiplier: 1.0,
        };
        for def in &config.resources {
            ledger.amounts.insert(def.id.clone(), 0.0);
            ledger.base_capacity.insert(def.id.clone(), def.base_capacity);
            ledger.production.insert(def.id.clone(), 0.0);
            ledger.consumption.insert(def.id.clone(), 0.0);
            if def.initially_visible {
                ledger.visible.insert(def.id.clone());
            }
        }
        for def in &config.resources {
            if def.initial_amount > 0.0 {
                ledger.set(&def.id, def.initial_amount);
            }
        }
        ledger
    }

    pub fn knows(&self, id: &str) -> bool {
        self.amounts.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ResourceId> {
        self.amounts.keys()
    }

    pub fn get(&self, id: &str) -> f64 {
        self.amounts.get(id).copied().unwrap_or(0.0)
    }

    pub fn base_capacity(&self, id: &str) -> f64 {
        self.base_capacity.get(id).copied().unwrap_or(0.0)
    }

    /// Effective capacity: floor(base × storage multiplier).
    pub fn capacity(&self, id: &str) -> f64 {
        (self.base_capacity(id) * self.storage_multiplier).floor()
    }

    pub fn storage_multiplier(&self) -> f64 {
        self.storage_multiplier
    }

    pub fn can_afford(&self, cost: &CostMap) -> bool {
        cost.iter().all(|(id, amount)| self.get(id) >= *amount)
    }

    /// Deduct every entry of `cost`, or nothing at all.
    pub fn spend(&mut self, cost: &CostMap) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for (id, amount) in cost {
            if let Some(stock) = self.amounts.get_mut(id) {
                *stock -= amount;
            }
        }
        true
    }

    /// Add up to capacity. Returns the delta actually applied.
    pub fn add(&mut self, id: &str, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let cap = self.capacity(id);
        let Some(stock) = self.amounts.get_mut(id) else {
            return 0.0;
        };
        let before = *stock;
        let after = (before + amount).min(cap);
        if after <= before {
            return 0.0;
        }
        *stock = after;
        after - before
    }

    /// Remove down to zero. Returns the amount actually removed.
    pub fn remove(&mut self, id: &str, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let Some(stock) = self.amounts.get_mut(id) else {
            return 0.0;
        };
        let before = *stock;
        *stock = (before - amount).max(0.0);
        before - *stock
    }

    /// Set a stock directly, clamped into [0, capacity].
    pub fn set(&mut self, id: &str, amount: f64) {
        let cap = self.capacity(id);
        if let Some(stock) = self.amounts.get_mut(id) {
            *stock = amount.clamp(0.0, cap.max(0.0));
        }
    }

    /// Shift base capacity. Shrinking clamps the stock.
    pub fn add_capacity(&mut self, id: &str, delta: f64) {
        if let Some(base) = self.base_capacity.get_mut(id) {
            *base = (*base + delta).max(0.0);
        }
        self.clamp_to_capacity(id);
    }

    /// Install the combined storage multiplier. Stocks above the new
    /// capacity are clamped.
    pub fn set_storage_multiplier(&mut self, multiplier: f64) {
        if multiplier == self.storage_multiplier {
            return;
        }
        self.storage_multiplier = multiplier;
        let ids: Vec<ResourceId> = self.amounts.keys().cloned().collect();
        for id in ids {
            self.clamp_to_capacity(&id);
        }
    }

    fn clamp_to_capacity(&mut self, id: &str) {
        let cap = self.capacity(id);
        if let Some(stock) = self.amounts.get_mut(id) {
            if *stock > cap {
                *stock = cap.max(0.0);
            }
        }
    }

    /// Make a resource visible. Returns true if it was hidden before.
    pub fn unlock(&mut self, id: &str) -> bool {
        if !self.knows(id) {
            return false;
        }
        self.visible.insert(id.to_string())
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    pub fn production(&self, id: &str) -> f64 {
        self.production.get(id).copied().unwrap_or(0.0)
    }

    pub fn consumption(&self, id: &str) -> f64 {
        self.consumption.get(id).copied().unwrap_or(0.0)
    }

    pub fn net_rate(&self, id: &str) -> f64 {
        self.production(id) - self.consumption(id)
    }

    /// Replace every rate with the sheet's values (missing ids → 0).
    pub fn install_rates(&mut self, sheet: &RateSheet) {
        for (id, rate) in self.production.iter_mut() {
            *rate = sheet.production.get(id).copied().unwrap_or(0.0);
        }
        for (id, rate) in self.consumption.iter_mut() {
            *rate = sheet.consumption.get(id).copied().unwrap_or(0.0);
        }
    }

    /// Apply one tick of production then consumption.
    pub fn tick(&mut self) {
        let produced: Vec<(ResourceId, f64)> = self
            .production
            .iter()
            .filter(|(_, rate)| **rate > 0.0)
            .map(|(id, rate)| (id.clone(), *rate))
            .collect();
        for (id, rate) in produced {
            self.add(&id, rate);
        }

        let consumed: Vec<(ResourceId, f64)> = self
            .consumption
            .iter()
            .filter(|(_, rate)| **rate > 0.0)
            .map(|(id, rate)| (id.clone(), *rate))
            .collect();
        for (id, rate) in consumed {
            self.remove(&id, rate);
        }
    }

    /// Visible resources in catalog order.
    pub fn visible_rows(&self, config: &ColonyConfig) -> Vec<ResourceRow> {
        config
            .resources
            .iter()
            .filter(|def| self.is_visible(&def.id))
            .map(|def| ResourceRow {
                id:       def.id.clone(),
                name:     def.name.clone(),
                amount:   self.get(&def.id),
                capacity: self.capacity(&def.id),
                net_rate: self.net_rate(&def.id),
            })
            .collect()
    }

    /// Ids referenced by this ledger that the config does not define.
    pub(crate) fn unknown_ids<'a>(&'a self, config: &ColonyConfig) -> Vec<&'a str> {
        self.amounts
            .keys()
            .chain(self.base_capacity.keys())
            .chain(self.visible.iter())
            .chain(self.production.keys())
            .chain(self.consumption.keys())
            .filter(|id| config.resource(id).is_none())
            .map(|id| id.as_str())
            .collect()
    }

    pub(crate) fn stocks_in_range(&self) -> bool {
        self.amounts.iter().all(|(id, amount)| {
            amount.is_finite() && *amount >= 0.0 && *amount <= self.capacity(id) + 1e-9
        })
    }
}
