//! Seeded random scenarios and the fire-count laws they must obey.
//!
//! Generated scenarios start every timer at time zero and only advance time
//! in whole ticks, so each timer's fire count is fully determined by the
//! total elapsed time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use faketimers_core::TimerBehavior;

use crate::error::SimulationError;
use crate::runner::RunReport;
use crate::scenario::{Scenario, Step, TimerSpec};

const MAX_PERIOD_TICKS: u64 = 20;
const MAX_ADVANCE_TICKS: u64 = 50;

pub struct RandomScenario {
    rng: StdRng,
    tick_ms: u64,
}

impl RandomScenario {
    pub fn new(seed: u64, tick_ms: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            tick_ms: tick_ms.max(1),
        }
    }

    /// Builds a scenario with `timers` started timers and `steps` advances.
    pub fn generate(&mut self, timers: usize, steps: usize) -> Scenario {
        let timers = (0..timers)
            .map(|i| TimerSpec {
                name: format!("timer-{}", i),
                period_ms: self.tick_ms * self.rng.random_range(1..=MAX_PERIOD_TICKS),
                behavior: if self.rng.random_bool(0.5) {
                    TimerBehavior::AutoReload
                } else {
                    TimerBehavior::SingleShot
                },
                start: true,
            })
            .collect();

        let steps = (0..steps)
            .map(|i| {
                if self.rng.random_bool(0.2) {
                    Step::Tick
                } else if self.rng.random_bool(0.1) {
                    Step::Defer {
                        label: format!("deferred-{}", i),
                    }
                } else {
                    Step::Advance {
                        ms: self.tick_ms * self.rng.random_range(0..=MAX_ADVANCE_TICKS),
                    }
                }
            })
            .collect();

        Scenario {
            tick_ms: Some(self.tick_ms),
            timers,
            steps,
        }
    }
}

/// Checks every timer's fire count against `floor(elapsed / period)` for
/// auto-reload timers and "once, if elapsed reached the period" for single-shot ones.
///
/// Only meaningful for scenarios whose timers all start at zero and are never
/// touched by a step, which is what [`RandomScenario`] generates. `tick` steps
/// count as the quantum the run actually used.
pub fn check_fire_counts(scenario: &Scenario, report: &RunReport) -> Result<(), SimulationError> {
    let elapsed = scenario.total_advance_ms(report.tick_ms);

    for timer in scenario.timers.iter().filter(|timer| timer.start) {
        let expected = match timer.behavior {
            TimerBehavior::AutoReload => elapsed / timer.period_ms,
            TimerBehavior::SingleShot => u64::from(elapsed >= timer.period_ms),
        } as usize;
        let actual = report.fires_of(&timer.name);
        if actual != expected {
            return Err(SimulationError::Invariant(format!(
                "{} ({:?}, {} ms) fired {} times over {} ms, expected {}",
                timer.name, timer.behavior, timer.period_ms, actual, elapsed, expected
            )));
        }
    }
    Ok(())
}
