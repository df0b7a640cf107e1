//! Scenario files.
//!
//! A scenario names a set of timers and a script of operations against them:
//!
//! ```yaml
//! tick_ms: 10
//! timers:
//!   - name: heartbeat
//!     period_ms: 100
//!     behavior: auto_reload
//!     start: true
//! steps:
//!   - advance: { ms: 150 }
//!   - change_period: { timer: heartbeat, period_ms: 50 }
//!   - defer: { label: flush }
//!   - tick
//! ```

use std::collections::HashSet;
use std::path::Path;

use faketimers_core::TimerBehavior;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::SimulationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_unique_names"))]
pub struct Scenario {
    /// Overrides the configured tick quantum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub tick_ms: Option<u64>,
    #[serde(default)]
    #[validate(nested)]
    pub timers: Vec<TimerSpec>,
    /// Data-carrying steps are single-key maps (`advance: { ms: 10 }`), unit
    /// steps plain strings (`tick`).
    #[serde(default, with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TimerSpec {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 1))]
    pub period_ms: u64,
    #[serde(default)]
    pub behavior: TimerBehavior,
    /// Start the timer right after creation.
    #[serde(default)]
    pub start: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Advance { ms: u64 },
    Tick,
    Start(String),
    Stop(String),
    Reset(String),
    Delete(String),
    ChangePeriod { timer: String, period_ms: u64 },
    SetBehavior { timer: String, behavior: TimerBehavior },
    Defer { label: String },
}

fn validate_unique_names(scenario: &Scenario) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    if scenario.timers.iter().all(|timer| seen.insert(timer.name.as_str())) {
        Ok(())
    } else {
        Err(ValidationError::new("duplicate_timer_name"))
    }
}

impl Scenario {
    pub fn from_yaml(content: &str) -> Result<Self, SimulationError> {
        let scenario: Scenario = serde_yaml::from_str(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn to_yaml(&self) -> Result<String, SimulationError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Total virtual time the script advances by, given the effective tick.
    pub fn total_advance_ms(&self, tick_ms: u64) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Advance { ms } => *ms,
                Step::Tick => tick_ms,
                _ => 0,
            })
            .sum()
    }
}

/// Loads and validates a scenario from a YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, SimulationError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(SimulationError::FileNotFound(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let content = std::fs::read_to_string(path)?;
    Scenario::from_yaml(&content)
}
