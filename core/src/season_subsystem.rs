//! SeasonClock: day/night, season and weather state machine, plus the
//! two low-probability random-event gates.
//!
//! RULES:
//!   - Night while tick % day_length ≥ day_length / 2.
//!   - Weather re-rolls every weather_duration ticks from the current
//!     season's table; a roll past the cumulative total takes the last
//!     entry.
//!   - Every season_length ticks the season advances, weather re-rolls,
//!     and the season happiness modifier REPLACES the previous one
//!     (applied by the engine from the returned report).
//!
//! Execution: step 1 of the colony tick.
//! Depends on: nothing but its own RNG stream.

use crate::{
    config::{EnvironmentEffects, RandomEventConfig, SeasonConfig},
    rng::SubsystemRng,
    types::Tick,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn index(self) -> usize {
        match self {
            Season::Spring => 0,
            Season::Summer => 1,
            Season::Autumn => 2,
            Season::Winter => 3,
        }
    }

    pub fn next(self) -> Season {
        Season::ALL[(self.index() + 1) % Season::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Sunny,
    Cloudy,
    Rain,
    HeatWave,
    ColdSnap,
    Snow,
}

impl Weather {
    pub fn label(self) -> &'static str {
        match self {
            Weather::Sunny    => "Sunny",
            Weather::Cloudy   => "Cloudy",
            Weather::Rain     => "Rainy",
            Weather::HeatWave => "Heat Wave",
            Weather::ColdSnap => "Cold Snap",
            Weather::Snow     => "Snowy",
        }
    }
}

/// Display phase within a day.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TimePhase {
    Dawn,
    Day,
    Dusk,
    Night,
}

/// What changed during one SeasonClock tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeasonReport {
    pub day_started:     Option<u64>,
    pub night_fell:      bool,
    pub weather_changed: Option<Weather>,
    /// Set when the season advanced; carries season + weather happiness.
    pub season_changed:  Option<(Season, f64)>,
}

/// Per-tick chances for the random-event gates, already scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateOdds {
    /// `None` while discovery is not possible.
    pub spring_discovery: Option<f64>,
    pub visitor_arrival:  f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateOutcome {
    pub discover_spring: bool,
    pub visitor_arrival: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeasonClock {
    tick_count:    Tick,
    day:           u64,
    season:        Season,
    weather:       Weather,
    night:         bool,
    weather_timer: Tick,
}

impl Default for SeasonClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SeasonClock {
    pub fn new() -> Self {
        Self {
            tick_count:    0,
            day:           1,
            season:        Season::Spring,
            weather:       Weather::Sunny,
            night:         false,
            weather_timer: 0,
        }
    }

    pub fn tick_count(&self) -> Tick { self.tick_count }
    pub fn day(&self) -> u64 { self.day }
    pub fn season(&self) -> Season { self.season }
    pub fn weather(&self) -> Weather { self.weather }
    pub fn is_night(&self) -> bool { self.night }
    pub fn weather_timer(&self) -> Tick { self.weather_timer }

    /// Advance time by one tick, re-rolling weather and season when due.
    pub fn tick(&mut self, config: &SeasonConfig, rng: &mut SubsystemRng) -> SeasonReport {
        let mut report = SeasonReport::default();
        self.tick_count += 1;

        let day_progress = self.tick_count % config.day_length;
        let was_night = self.night;
        self.night = day_progress >= config.day_length / 2;
        if self.night && !was_night {
            report.night_fell = true;
        }

        if day_progress == 0 {
            self.day += 1;
            report.day_started = Some(self.day);
        }

        self.weather_timer += 1;
        if self.weather_timer >= config.weather_duration {
            self.weather_timer = 0;
            if self.reroll_weather(config, rng) {
                report.weather_changed = Some(self.weather);
            }
        }

        if self.tick_count % config.season_length == 0 {
            self.season = self.season.next();
            if self.reroll_weather(config, rng) {
                report.weather_changed = Some(self.weather);
            }
            report.season_changed = Some((self.season, self.happiness_modifier(config)));
            log::debug!(
                "tick={} season={:?} weather={:?}",
                self.tick_count,
                self.season,
                self.weather
            );
        }

        report
    }

    /// Cumulative draw over the season table. Returns true if the
    /// weather actually changed.
    fn reroll_weather(&mut self, config: &SeasonConfig, rng: &mut SubsystemRng) -> bool {
        let Some(table) = config.weather_tables.get(&self.season) else {
            return false;
        };
        let Some(last) = table.last() else {
            return false;
        };
        let roll = rng.next_f64();
        let mut cumulative = 0.0;
        let mut picked = last.weather;
        for odds in table {
            cumulative += odds.probability;
            if roll <= cumulative {
                picked = odds.weather;
                break;
            }
        }
        let changed = picked != self.weather;
        self.weather = picked;
        changed
    }

    /// Roll both random-event gates. Discovery draws only when eligible.
    pub fn roll_gates(&self, odds: GateOdds, rng: &mut SubsystemRng) -> GateOutcome {
        let discover_spring = match odds.spring_discovery {
            Some(p) => rng.chance(p),
            None => false,
        };
        let visitor_arrival = rng.chance(odds.visitor_arrival);
        GateOutcome { discover_spring, visitor_arrival }
    }

    /// Base gate odds before research/prestige multipliers.
    /// Discovery needs no natural spring yet and a grace period elapsed.
    pub fn base_gate_odds(
        &self,
        seasons: &SeasonConfig,
        events: &RandomEventConfig,
        natural_spring_found: bool,
    ) -> GateOdds {
        let spring_discovery = (!natural_spring_found
            && self.tick_count > events.discovery_grace_ticks)
            .then_some(events.spring_discovery_chance);
        GateOdds {
            spring_discovery,
            visitor_arrival: events.visitor_chance * self.visitor_chance_multiplier(seasons),
        }
    }

    fn season_effects<'a>(&self, config: &'a SeasonConfig) -> Option<&'a EnvironmentEffects> {
        config.season_effects.get(&self.season)
    }

    fn weather_effects<'a>(&self, config: &'a SeasonConfig) -> Option<&'a EnvironmentEffects> {
        config.weather_effects.get(&self.weather)
    }

    /// Season happiness + weather happiness.
    pub fn happiness_modifier(&self, config: &SeasonConfig) -> f64 {
        self.season_effects(config).map(|e| e.happiness).unwrap_or(0.0)
            + self.weather_effects(config).map(|e| e.happiness).unwrap_or(0.0)
    }

    /// Season factor × weather factor × night penalty.
    pub fn outdoor_work_multiplier(&self, config: &SeasonConfig, night_penalty: f64) -> f64 {
        let mut multiplier = 1.0;
        if let Some(f) = self.season_effects(config).and_then(|e| e.outdoor_work) {
            multiplier *= f;
        }
        if let Some(f) = self.weather_effects(config).and_then(|e| e.outdoor_work) {
            multiplier *= f;
        }
        if self.night {
            multiplier *= night_penalty;
        }
        multiplier
    }

    pub fn visitor_chance_multiplier(&self, config: &SeasonConfig) -> f64 {
        self.season_effects(config)
            .and_then(|e| e.visitor_chance)
            .unwrap_or(1.0)
    }

    /// Most likely weather for the current season; first entry wins ties.
    pub fn forecast(&self, config: &SeasonConfig) -> Option<Weather> {
        let table = config.weather_tables.get(&self.season)?;
        let mut best: Option<(Weather, f64)> = None;
        for odds in table {
            match best {
                Some((_, p)) if odds.probability <= p => {}
                _ => best = Some((odds.weather, odds.probability)),
            }
        }
        best.map(|(weather, _)| weather)
    }

    pub fn ticks_until_weather_change(&self, config: &SeasonConfig) -> Tick {
        config.weather_duration.saturating_sub(self.weather_timer)
    }

    pub fn time_phase(&self, config: &SeasonConfig) -> TimePhase {
        let progress = self.tick_count % config.day_length;
        let eighth = config.day_length / 8;
        let half = config.day_length / 2;
        if progress < eighth {
            TimePhase::Dawn
        } else if progress < half {
            TimePhase::Day
        } else if progress < half + eighth {
            TimePhase::Dusk
        } else {
            TimePhase::Night
        }
    }

    pub(crate) fn is_consistent(&self, config: &SeasonConfig) -> bool {
        self.day >= 1
            && self.weather_timer < config.weather_duration
            && self.night == (self.tick_count % config.day_length >= config.day_length / 2)
    }
}
