/*!
# faketimers Simulator

Scripted, deterministic runs of the `faketimers-core` engine.

## Key Components:
- **Scenario:** YAML description of timers and a script of operations.
- **Runner:** Executes a scenario, records every firing and deferred call, and
  hashes the result so runs can be compared.
- **Randomized:** Seeded scenario generation plus the fire-count laws used to
  check runs.
*/

pub mod error;
pub mod randomized;
pub mod runner;
pub mod scenario;

pub use error::SimulationError;
pub use randomized::{check_fire_counts, RandomScenario};
pub use runner::{RunReport, ScenarioRunner, TimerState, TraceEvent};
pub use scenario::{load_scenario, Scenario, Step, TimerSpec};
