//! Scenario simulator configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Scenario run when the CLI gets no `--scenario`.
    #[validate(custom(function = "crate::validation::validate_scenario_extension"))]
    pub default_scenario: Option<PathBuf>,
    /// Random scenarios per `fuzz` run when none is given.
    #[validate(range(min = 1))]
    pub fuzz_iterations: usize,
    /// Timers per generated scenario.
    #[validate(range(min = 1, max = 1024))]
    pub fuzz_timers: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            default_scenario: None,
            fuzz_iterations: 100,
            fuzz_timers: 8,
        }
    }
}
