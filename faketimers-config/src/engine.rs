//! Timer engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    /// Tick quantum in milliseconds; every timer period must be a multiple of it.
    #[validate(range(min = 1, message = "tick quantum must be at least 1 ms"))]
    pub tick_quantum_ms: u64,
    /// Registry slots reserved up front.
    #[validate(range(max = 65536))]
    pub initial_slots: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_quantum_ms: 10,
            initial_slots: 8,
        }
    }
}

impl EngineConfig {
    #[inline]
    pub fn tick_quantum(&self) -> Duration {
        Duration::from_millis(self.tick_quantum_ms)
    }
}
