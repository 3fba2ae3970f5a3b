//! Simulation clock: owns tick state, speed control, pause, and the
//! real-time accumulator.
//!
//! The driver measures elapsed real milliseconds and asks the clock how
//! many whole ticks are due. The remainder is carried forward so that a
//! backgrounded session catches up deterministically instead of losing
//! time.

use crate::types::{RunId, Tick};
use serde::{Deserialize, Serialize};

/// Nominal real-time length of one tick at normal speed.
pub const TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub run_id:       RunId,
    pub current_tick: Tick,
    pub speed:        SimSpeed,
    pub paused:       bool,
    /// Scaled milliseconds not yet converted into a tick.
    #[serde(default)]
    pub carry_ms:     u64,
}

impl SimClock {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            current_tick: 0,
            speed: SimSpeed::Normal,
            paused: false,
            carry_ms: 0,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    pub fn pause(&mut self)  { self.paused = true;  }
    pub fn resume(&mut self) { self.paused = false; }

    pub fn set_speed(&mut self, speed: SimSpeed) {
        self.speed = speed;
    }

    /// Real-time multiplier applied to elapsed milliseconds.
    pub fn time_scale(&self) -> u64 {
        match self.speed {
            SimSpeed::Normal      => 1,
            SimSpeed::Accelerated => 5,
            SimSpeed::FastForward => 20,
        }
    }

    /// Convert elapsed real milliseconds into whole due ticks, carrying
    /// the remainder. Returns 0 and accumulates nothing while paused.
    pub fn ticks_due(&mut self, elapsed_ms: u64) -> u64 {
        if self.paused {
            return 0;
        }
        let total = self.carry_ms + elapsed_ms.saturating_mul(self.time_scale());
        self.carry_ms = total % TICK_INTERVAL_MS;
        total / TICK_INTERVAL_MS
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SimSpeed {
    Normal,       // 10 ticks per real second
    Accelerated,  // 50 ticks per real second
    FastForward,  // 200 ticks per real second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remainder_is_carried_between_calls() {
        let mut clock = SimClock::new("run-test".into());
        assert_eq!(clock.ticks_due(250), 2);
        assert_eq!(clock.carry_ms, 50);
        assert_eq!(clock.ticks_due(50), 1);
        assert_eq!(clock.carry_ms, 0);
    }

    #[test]
    fn paused_clock_accumulates_nothing() {
        let mut clock = SimClock::new("run-test".into());
        clock.pause();
        assert_eq!(clock.ticks_due(10_000), 0);
        assert_eq!(clock.carry_ms, 0);
    }

    #[test]
    fn speed_scales_elapsed_time() {
        let mut clock = SimClock::new("run-test".into());
        clock.set_speed(SimSpeed::FastForward);
        assert_eq!(clock.ticks_due(100), 20);
    }
}
