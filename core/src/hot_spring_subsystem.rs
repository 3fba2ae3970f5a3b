//! HotSpringSimulator: the colony's thermal accumulator and the finite
//! soak/relaxation scheduler.
//!
//! RULES:
//!   - Warmth stays in [0, max_warmth]. Max is the unheated ceiling while
//!     no spring exists, else min(ceiling, base + per_spring × n).
//!   - Occupancy of every spring stays ≤ capacity + research bonus.
//!   - Occupants are integer tokens from a monotone counter. They carry
//!     no identity beyond the soak → relaxation hand-off.
//!
//! Per-tick order: warmth → soak timers (expired sessions become
//! relaxation buffs) → buff timers (including buffs created this tick)
//! → auto_rotate.
//!
//! Execution: step 2 of the colony tick.

use crate::{
    config::{SpringTemplate, SpringType, ThermalConfig},
    season_subsystem::{Season, Weather},
    types::Tick,
};
use serde::{Deserialize, Serialize};

pub type OccupantToken = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotSpring {
    pub spring_type:       SpringType,
    pub capacity:          u32,
    pub warmth:            f64,
    pub weather_protected: bool,
    pub occupants:         u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoakSession {
    pub token:     OccupantToken,
    pub spring:    usize,
    pub remaining: Tick,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelaxationBuff {
    pub token:     OccupantToken,
    pub remaining: Tick,
}

/// Everything a thermal tick reads from the rest of the colony.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalInputs {
    pub population:           u32,
    pub idle:                 u32,
    pub keepers:              u32,
    pub season:               Season,
    pub weather:              Weather,
    pub night:                bool,
    pub warmth_bonus:         f64,
    pub capacity_bonus:       u32,
    pub relaxation_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotSpringSimulator {
    warmth:     f64,
    max_warmth: f64,
    springs:    Vec<HotSpring>,
    soaking:    Vec<SoakSession>,
    relaxed:    Vec<RelaxationBuff>,
    next_token: OccupantToken,
}

impl HotSpringSimulator {
    pub fn new(config: &ThermalConfig) -> Self {
        Self {
            warmth:     config.initial_warmth.clamp(0.0, config.unheated_max_warmth),
            max_warmth: config.unheated_max_warmth,
            springs:    Vec::new(),
            soaking:    Vec::new(),
            relaxed:    Vec::new(),
            next_token: 0,
        }
    }

    pub fn warmth(&self) -> f64 { self.warmth }
    pub fn max_warmth(&self) -> f64 { self.max_warmth }
    pub fn springs(&self) -> &[HotSpring] { &self.springs }
    pub fn spring_count(&self) -> usize { self.springs.len() }
    pub fn soak_sessions(&self) -> &[SoakSession] { &self.soaking }
    pub fn relaxation_buffs(&self) -> &[RelaxationBuff] { &self.relaxed }
    pub fn soaking_count(&self) -> u32 { self.soaking.len() as u32 }

    /// Warmth as a rounded percentage of the current maximum.
    pub fn warmth_percent(&self) -> f64 {
        if self.max_warmth <= 0.0 {
            return 0.0;
        }
        (self.warmth / self.max_warmth * 100.0).round()
    }

    pub fn set_warmth(&mut self, warmth: f64) {
        self.warmth = warmth.clamp(0.0, self.max_warmth);
    }

    /// Instantiate a spring from a building template. Returns true if
    /// this was the colony's first spring.
    pub fn add_spring(&mut self, template: &SpringTemplate, config: &ThermalConfig) -> bool {
        self.springs.push(HotSpring {
            spring_type:       template.spring_type,
            capacity:          template.capacity,
            warmth:            template.warmth,
            weather_protected: template.weather_protected,
            occupants:         0,
        });
        self.refresh_max_warmth(config);
        self.springs.len() == 1
    }

    fn expected_max_warmth(&self, config: &ThermalConfig) -> f64 {
        if self.springs.is_empty() {
            config.unheated_max_warmth
        } else {
            (config.base_max_warmth + config.max_warmth_per_spring * self.springs.len() as f64)
                .min(config.warmth_ceiling)
        }
    }

    fn refresh_max_warmth(&mut self, config: &ThermalConfig) {
        self.max_warmth = self.expected_max_warmth(config);
        self.warmth = self.warmth.clamp(0.0, self.max_warmth);
    }

    /// Stored ceiling agrees with the spring count.
    pub(crate) fn max_warmth_matches(&self, config: &ThermalConfig) -> bool {
        (self.max_warmth - self.expected_max_warmth(config)).abs() < 1e-9
    }

    pub fn generation(&self, config: &ThermalConfig, inputs: &ThermalInputs) -> f64 {
        let raw: f64 = self
            .springs
            .iter()
            .map(|spring| {
                let penalty = if spring.weather_protected {
                    1.0
                } else {
                    config.weather_generation.get(&inputs.weather).copied().unwrap_or(1.0)
                };
                spring.warmth * penalty
            })
            .sum();
        raw * (1.0 + config.keeper_bonus * inputs.keepers as f64) * (1.0 + inputs.warmth_bonus)
    }

    pub fn consumption(&self, config: &ThermalConfig, inputs: &ThermalInputs) -> f64 {
        let season = config.season_consumption.get(&inputs.season).copied().unwrap_or(1.0);
        let night = if inputs.night { config.night_consumption } else { 1.0 };
        let weather = config.weather_consumption.get(&inputs.weather).copied().unwrap_or(1.0);
        inputs.population as f64 * config.consumption_per_member * season * night * weather
    }

    pub fn spring_capacity(&self, index: usize, capacity_bonus: u32) -> u32 {
        self.springs
            .get(index)
            .map(|s| s.capacity + capacity_bonus)
            .unwrap_or(0)
    }

    pub fn total_capacity(&self, capacity_bonus: u32) -> u32 {
        (0..self.springs.len())
            .map(|i| self.spring_capacity(i, capacity_bonus))
            .sum()
    }

    pub fn available_slots(&self, capacity_bonus: u32) -> u32 {
        self.total_capacity(capacity_bonus)
            .saturating_sub(self.soaking_count())
    }

    /// Seat `token` in the first spring with room.
    pub fn start_soaking(
        &mut self,
        token: OccupantToken,
        config: &ThermalConfig,
        capacity_bonus: u32,
    ) -> bool {
        if self.available_slots(capacity_bonus) == 0 {
            return false;
        }
        if self.soaking.iter().any(|s| s.token == token) {
            return false;
        }
        let Some(index) = self
            .springs
            .iter()
            .position(|s| s.occupants < s.capacity + capacity_bonus)
        else {
            return false;
        };
        self.springs[index].occupants += 1;
        self.soaking.push(SoakSession {
            token,
            spring: index,
            remaining: config.soak_duration,
        });
        true
    }

    /// End a soak and grant its relaxation buff.
    pub fn stop_soaking(
        &mut self,
        token: OccupantToken,
        config: &ThermalConfig,
        relaxation_multiplier: f64,
    ) -> bool {
        let Some(pos) = self.soaking.iter().position(|s| s.token == token) else {
            return false;
        };
        let session = self.soaking.remove(pos);
        if let Some(spring) = self.springs.get_mut(session.spring) {
            spring.occupants = spring.occupants.saturating_sub(1);
        }
        let duration = (config.relaxation_duration as f64 * relaxation_multiplier).ceil() as Tick;
        match self.relaxed.iter_mut().find(|b| b.token == token) {
            Some(buff) => buff.remaining = duration,
            None => self.relaxed.push(RelaxationBuff { token, remaining: duration }),
        }
        true
    }

    pub fn has_relaxation_buff(&self, token: OccupantToken) -> bool {
        self.relaxed.iter().any(|b| b.token == token && b.remaining > 0)
    }

    pub fn relaxed_count(&self) -> u32 {
        self.relaxed.iter().filter(|b| b.remaining > 0).count() as u32
    }

    pub fn tick(&mut self, config: &ThermalConfig, inputs: &ThermalInputs) {
        let net = (self.generation(config, inputs) - self.consumption(config, inputs)) * config.net_scale;
        self.warmth = (self.warmth + net).clamp(0.0, self.max_warmth);

        let mut expired = Vec::new();
        for session in self.soaking.iter_mut() {
            session.remaining = session.remaining.saturating_sub(1);
            if session.remaining == 0 {
                expired.push(session.token);
            }
        }
        for token in expired {
            self.stop_soaking(token, config, inputs.relaxation_multiplier);
        }

        for buff in self.relaxed.iter_mut() {
            buff.remaining = buff.remaining.saturating_sub(1);
        }
        self.relaxed.retain(|b| b.remaining > 0);

        self.auto_rotate(config, inputs.idle, inputs.capacity_bonus);
    }

    /// Fill free slots with fresh tokens, one per idle worker.
    pub fn auto_rotate(&mut self, config: &ThermalConfig, idle: u32, capacity_bonus: u32) -> u32 {
        let to_soak = idle.min(self.available_slots(capacity_bonus));
        let mut seated = 0;
        for _ in 0..to_soak {
            let token = self.next_token;
            self.next_token += 1;
            if self.start_soaking(token, config, capacity_bonus) {
                seated += 1;
            }
        }
        seated
    }

    /// Occupancy bookkeeping agrees with the session list and capacities.
    pub(crate) fn is_consistent(&self, capacity_bonus: u32) -> bool {
        let warmth_ok = self.warmth.is_finite() && self.warmth >= 0.0 && self.warmth <= self.max_warmth;
        let sessions_ok = self.soaking.iter().all(|s| {
            s.spring < self.springs.len() && s.token < self.next_token
        }) && self.relaxed.iter().all(|b| b.token < self.next_token);
        let occupancy_ok = self.springs.iter().enumerate().all(|(i, spring)| {
            let seated = self.soaking.iter().filter(|s| s.spring == i).count() as u32;
            seated == spring.occupants && spring.occupants <= spring.capacity + capacity_bonus
        });
        warmth_ok && sessions_ok && occupancy_ok
    }
}
