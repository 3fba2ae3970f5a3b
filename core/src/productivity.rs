//! ProductivityAggregator: folds the cross-cutting multipliers into one
//! scalar, and turns the workforce into per-resource rates.
//!
//! Both entry points are pure functions of a `WorldView`.

use crate::{
    subsystem::WorldView,
    types::ResourceId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// p ≥ 70 → 1 + (p − 70)/60; p < 30 → 0.25 + (p/30)·0.75; else 1.
pub fn warmth_multiplier(percent: f64) -> f64 {
    if percent >= 70.0 {
        1.0 + (percent - 70.0) / 60.0
    } else if percent < 30.0 {
        0.25 + (percent / 30.0) * 0.75
    } else {
        1.0
    }
}

/// 1 + min(relaxed, workers)/workers · bonus; 1 with no workers.
pub fn relaxation_multiplier(relaxed: u32, workers: u32, bonus: f64) -> f64 {
    if workers == 0 {
        return 1.0;
    }
    1.0 + relaxed.min(workers) as f64 / workers as f64 * bonus
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ProductivityBreakdown {
    pub warmth:        f64,
    pub relaxation:    f64,
    pub outdoor:       f64,
    pub night_visitor: f64,
    pub prestige:      f64,
}

impl ProductivityBreakdown {
    pub fn total(&self) -> f64 {
        self.warmth * self.relaxation * self.outdoor * self.night_visitor * self.prestige
    }
}

pub fn productivity(view: &WorldView<'_>) -> ProductivityBreakdown {
    let config = view.config;
    let workers = view.workforce.adults().saturating_sub(view.workforce.idle());
    ProductivityBreakdown {
        warmth:        warmth_multiplier(view.springs.warmth_percent()),
        relaxation:    relaxation_multiplier(
            view.springs.relaxed_count(),
            workers,
            config.productivity.relaxation_bonus,
        ),
        outdoor:       view
            .seasons
            .outdoor_work_multiplier(&config.seasons, config.productivity.night_outdoor_penalty),
        night_visitor: view.visitors.night_bonus(config, view.seasons.is_night()),
        prestige:      1.0 + view.prestige.bonuses().gathering_bonus,
    }
}

/// Per-tick production and consumption for every resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RateSheet {
    pub production:  BTreeMap<ResourceId, f64>,
    pub consumption: BTreeMap<ResourceId, f64>,
}

impl RateSheet {
    pub fn production(&self, id: &str) -> f64 {
        self.production.get(id).copied().unwrap_or(0.0)
    }

    pub fn consumption(&self, id: &str) -> f64 {
        self.consumption.get(id).copied().unwrap_or(0.0)
    }
}

pub fn compute_rates(view: &WorldView<'_>) -> RateSheet {
    let config = view.config;
    let multiplier = productivity(view).total();
    let visitor_bonus = view.research.bonuses().visitor_bonus;
    let mut sheet = RateSheet::default();

    for job in &config.jobs {
        let workers = view.workforce.job_count(&job.id);
        if workers == 0 {
            continue;
        }
        for (res, amount) in &job.produces {
            let mut produced = amount * workers as f64 * multiplier;
            let research = view.research.production_bonus(res);
            if research > 0.0 {
                produced *= 1.0 + research;
            }
            produced *= view.visitors.production_multiplier(config, res, visitor_bonus);
            *sheet.production.entry(res.clone()).or_insert(0.0) += produced;
        }
        for (res, amount) in &job.consumes {
            *sheet.consumption.entry(res.clone()).or_insert(0.0) += amount * workers as f64;
        }
    }

    let science = &config.productivity.science_resource;
    if let Some(rate) = sheet.production.get_mut(science) {
        if *rate > 0.0 {
            let bonus = view.research.bonuses().science_bonus + view.prestige.bonuses().science_bonus;
            if bonus > 0.0 {
                *rate *= 1.0 + bonus;
            }
            *rate *= view.buildings.science_multiplier(config);
        }
    }

    let food = &config.workforce.food_resource;
    *sheet.consumption.entry(food.clone()).or_insert(0.0) +=
        view.workforce.total() as f64 * config.workforce.food_per_member;

    sheet
}
