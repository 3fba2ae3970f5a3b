//! WorkforceAllocator: population counts, job assignment, growth,
//! maturation and happiness scoring.
//!
//! RULES:
//!   - Σ assigned workers ≤ adults, always.
//!   - Happiness is base + persistent modifiers + dynamic terms, clamped
//!     to [0, 100]. Dynamic keys are rewritten on every calculation and
//!     never counted twice.
//!   - Maturation is one coin flip per tick regardless of pup count.
//!
//! Execution: step 5 of the colony tick (after resources).

use crate::{
    config::{ColonyConfig, JobRole, WorkforceConfig},
    rng::SubsystemRng,
    types::{CostMap, JobId},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Happiness keys recomputed on every calculation.
pub const DYNAMIC_BONUS_KEYS:   [&str; 4] = ["warmth", "visitors", "butterflies", "healers"];
pub const DYNAMIC_PENALTY_KEYS: [&str; 3] = ["overcrowding", "food_shortage", "cold"];

pub const SEASON_KEY:      &str = "season";
pub const HOT_SPRINGS_KEY: &str = "hot_springs";

pub fn building_key(building: &str) -> String {
    format!("building_{building}")
}

/// What happiness depends on outside the workforce itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HappinessInputs {
    /// Config base + research base bonus.
    pub base:              f64,
    pub food_stock:        f64,
    pub warmth_percent:    f64,
    /// Σ species happiness × visitor bonus multiplier.
    pub visitor_happiness: f64,
    /// Happiness-kind visitor bonuses, already scaled.
    pub extra_happiness:   f64,
}

/// Pure result of a happiness evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct HappinessOutcome {
    pub value:     f64,
    pub bonuses:   BTreeMap<String, f64>,
    pub penalties: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HappinessFactor {
    pub source: String,
    pub value:  f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobRow {
    pub id:       JobId,
    pub name:     String,
    pub workers:  u32,
    pub produces: CostMap,
    pub consumes: CostMap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkforceReport {
    pub pup_born:    bool,
    pub pup_matured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkforceAllocator {
    adults:              u32,
    pups:                u32,
    max_population:      u32,
    growth_progress:     f64,
    jobs:                BTreeMap<JobId, u32>,
    unlocked_jobs:       BTreeSet<JobId>,
    happiness_bonuses:   BTreeMap<String, f64>,
    happiness_penalties: BTreeMap<String, f64>,
    happiness:           f64,
}

impl WorkforceAllocator {
    pub fn new(config: &ColonyConfig, adults: u32) -> Self {
        Self {
            adults,
            pups:                0,
            max_population:      config.workforce.base_housing,
            growth_progress:     0.0,
            jobs:                config.jobs.iter().map(|j| (j.id.clone(), 0)).collect(),
            unlocked_jobs:       config
                .jobs
                .iter()
                .filter(|j| j.unlocked_by_default)
                .map(|j| j.id.clone())
                .collect(),
            happiness_bonuses:   BTreeMap::new(),
            happiness_penalties: BTreeMap::new(),
            happiness:           config.workforce.base_happiness,
        }
    }

    // ── Counts ─────────────────────────────────────────────────

    pub fn adults(&self) -> u32 { self.adults }
    pub fn pups(&self) -> u32 { self.pups }
    pub fn total(&self) -> u32 { self.adults + self.pups }
    pub fn max_population(&self) -> u32 { self.max_population }
    pub fn growth_progress(&self) -> f64 { self.growth_progress }
    pub fn happiness(&self) -> f64 { self.happiness }

    pub fn assigned(&self) -> u32 {
        self.jobs.values().sum()
    }

    pub fn idle(&self) -> u32 {
        self.adults.saturating_sub(self.assigned())
    }

    pub fn job_count(&self, id: &str) -> u32 {
        self.jobs.get(id).copied().unwrap_or(0)
    }

    pub fn jobs(&self) -> &BTreeMap<JobId, u32> {
        &self.jobs
    }

    /// Workers assigned to every job carrying `role`.
    pub fn role_count(&self, config: &ColonyConfig, role: JobRole) -> u32 {
        config
            .jobs
            .iter()
            .filter(|j| j.role == Some(role))
            .map(|j| self.job_count(&j.id))
            .sum()
    }

    pub fn growth_percent(&self, config: &WorkforceConfig) -> f64 {
        (self.growth_progress / config.growth_threshold * 100.0).min(100.0)
    }

    pub fn set_max_population(&mut self, max: u32) {
        self.max_population = max;
    }

    // ── Jobs ───────────────────────────────────────────────────

    pub fn is_job_unlocked(&self, id: &str) -> bool {
        self.unlocked_jobs.contains(id)
    }

    /// Returns true if the job was locked before.
    pub fn unlock_job(&mut self, id: &str) -> bool {
        if !self.jobs.contains_key(id) {
            return false;
        }
        self.unlocked_jobs.insert(id.to_string())
    }

    pub fn assign_job(&mut self, id: &str) -> bool {
        if !self.is_job_unlocked(id) || self.idle() == 0 {
            return false;
        }
        match self.jobs.get_mut(id) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    pub fn unassign_job(&mut self, id: &str) -> bool {
        match self.jobs.get_mut(id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }

    /// Unlocked jobs in catalog order.
    pub fn job_rows(&self, config: &ColonyConfig) -> Vec<JobRow> {
        config
            .jobs
            .iter()
            .filter(|j| self.is_job_unlocked(&j.id))
            .map(|j| JobRow {
                id:       j.id.clone(),
                name:     j.name.clone(),
                workers:  self.job_count(&j.id),
                produces: j.produces.clone(),
                consumes: j.consumes.clone(),
            })
            .collect()
    }

    // ── Happiness ledger ───────────────────────────────────────

    pub fn happiness_bonuses(&self) -> &BTreeMap<String, f64> {
        &self.happiness_bonuses
    }

    pub fn happiness_penalties(&self) -> &BTreeMap<String, f64> {
        &self.happiness_penalties
    }

    pub fn add_happiness_bonus(&mut self, source: &str, amount: f64) {
        self.happiness_bonuses.insert(source.to_string(), amount);
    }

    pub fn add_happiness_penalty(&mut self, source: &str, amount: f64) {
        self.happiness_penalties.insert(source.to_string(), amount);
    }

    pub fn remove_happiness_modifier(&mut self, source: &str) {
        self.happiness_bonuses.remove(source);
        self.happiness_penalties.remove(source);
    }

    /// Replace the season-sourced modifier.
    pub fn set_season_modifier(&mut self, modifier: f64) {
        self.remove_happiness_modifier(SEASON_KEY);
        if modifier > 0.0 {
            self.add_happiness_bonus(SEASON_KEY, modifier);
        } else if modifier < 0.0 {
            self.add_happiness_penalty(SEASON_KEY, -modifier);
        }
    }

    /// Evaluate happiness without touching the ledger.
    pub fn compute_happiness(&self, config: &ColonyConfig, inputs: &HappinessInputs) -> HappinessOutcome {
        let cfg = &config.workforce;
        let mut value = inputs.base;

        value += self
            .happiness_bonuses
            .iter()
            .filter(|(k, _)| !DYNAMIC_BONUS_KEYS.contains(&k.as_str()))
            .map(|(_, v)| *v)
            .sum::<f64>();
        value -= self
            .happiness_penalties
            .iter()
            .filter(|(k, _)| !DYNAMIC_PENALTY_KEYS.contains(&k.as_str()))
            .map(|(_, v)| *v)
            .sum::<f64>();

        let mut bonuses = BTreeMap::new();
        let mut penalties = BTreeMap::new();
        let population = self.total() as f64;

        let excess = self.total().saturating_sub(self.max_population) as f64;
        if excess > 0.0 {
            penalties.insert("overcrowding".to_string(), excess * cfg.overcrowding_penalty);
        }

        let buffer = population * cfg.food_buffer_per_member;
        if inputs.food_stock < buffer {
            let shortage = ((buffer - inputs.food_stock) / cfg.food_buffer_per_member).floor();
            if shortage > 0.0 {
                penalties.insert("food_shortage".to_string(), shortage * cfg.food_shortage_penalty);
            }
        }

        let p = inputs.warmth_percent;
        if p > 70.0 {
            let bonus = ((p - 70.0) / 10.0).floor() * cfg.warmth_bonus_step;
            if bonus > 0.0 {
                bonuses.insert("warmth".to_string(), bonus);
            }
        } else if p < 30.0 {
            let penalty = ((30.0 - p) / 10.0).floor() * cfg.cold_penalty_step;
            if penalty > 0.0 {
                penalties.insert("cold".to_string(), penalty);
            }
        }

        if inputs.visitor_happiness > 0.0 {
            bonuses.insert("visitors".to_string(), inputs.visitor_happiness);
        }
        if inputs.extra_happiness > 0.0 {
            bonuses.insert("butterflies".to_string(), inputs.extra_happiness);
        }

        let healers = self.role_count(config, JobRole::Healer);
        if healers > 0 {
            bonuses.insert("healers".to_string(), healers as f64 * cfg.healer_happiness);
        }

        value += bonuses.values().sum::<f64>();
        value -= penalties.values().sum::<f64>();

        HappinessOutcome {
            value: value.clamp(0.0, 100.0),
            bonuses,
            penalties,
        }
    }

    /// Evaluate happiness and rewrite the dynamic keys.
    pub fn calculate_happiness(&mut self, config: &ColonyConfig, inputs: &HappinessInputs) -> f64 {
        let outcome = self.compute_happiness(config, inputs);
        for key in DYNAMIC_BONUS_KEYS {
            self.happiness_bonuses.remove(key);
        }
        for key in DYNAMIC_PENALTY_KEYS {
            self.happiness_penalties.remove(key);
        }
        self.happiness_bonuses.extend(outcome.bonuses);
        self.happiness_penalties.extend(outcome.penalties);
        self.happiness = outcome.value;
        outcome.value
    }

    /// Line items: base first, then bonuses, then penalties (negated).
    pub fn happiness_factors(&self, base: f64) -> Vec<HappinessFactor> {
        let mut factors = vec![HappinessFactor { source: "base".to_string(), value: base }];
        factors.extend(self.happiness_bonuses.iter().map(|(k, v)| HappinessFactor {
            source: k.clone(),
            value:  *v,
        }));
        factors.extend(self.happiness_penalties.iter().map(|(k, v)| HappinessFactor {
            source: k.clone(),
            value:  -*v,
        }));
        factors
    }

    // ── Tick ───────────────────────────────────────────────────

    pub fn tick(
        &mut self,
        config: &ColonyConfig,
        inputs: &HappinessInputs,
        rng: &mut SubsystemRng,
    ) -> WorkforceReport {
        let cfg = &config.workforce;
        let mut report = WorkforceReport::default();
        let happiness = self.calculate_happiness(config, inputs);

        let population = self.total() as f64;
        let surplus = inputs.food_stock - population * cfg.food_surplus_per_member;

        let mut rate = cfg.base_growth_rate;
        if happiness > 50.0 {
            rate += (happiness - 50.0) * cfg.happy_growth_per_point;
        } else {
            rate -= (50.0 - happiness) * cfg.unhappy_growth_per_point;
        }
        if surplus > 0.0 {
            rate += (surplus / cfg.food_surplus_divisor).min(cfg.max_food_growth);
        }
        if self.total() >= self.max_population {
            rate = 0.0;
        }

        if rate > 0.0 {
            self.growth_progress += rate;
            if self.growth_progress >= cfg.growth_threshold {
                self.growth_progress = 0.0;
                if self.total() < self.max_population {
                    self.pups += 1;
                    report.pup_born = true;
                }
            }
        }

        if self.pups > 0 && rng.chance(cfg.maturation_chance) {
            self.pups -= 1;
            self.adults += 1;
            report.pup_matured = true;
        }

        report
    }

    pub(crate) fn unknown_jobs<'a>(&'a self, config: &ColonyConfig) -> Vec<&'a str> {
        self.jobs
            .keys()
            .chain(self.unlocked_jobs.iter())
            .filter(|id| config.job(id).is_none())
            .map(|id| id.as_str())
            .collect()
    }

    pub(crate) fn is_consistent(&self) -> bool {
        self.assigned() <= self.adults
            && self.growth_progress.is_finite()
            && self.growth_progress >= 0.0
            && (0.0..=100.0).contains(&self.happiness)
    }
}
