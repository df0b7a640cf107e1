use std::time::Duration;

use thiserror::Error;

use crate::handle::TimerHandle;

/// Recoverable errors returned by timer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("Invalid timer period {period:?} for a {tick_quantum:?} tick quantum")]
    InvalidPeriod {
        period: Duration,
        tick_quantum: Duration,
    },

    #[error("Invalid timer handle {0}")]
    InvalidHandle(TimerHandle),

    #[error("Timer handle space exhausted")]
    HandleSpaceExhausted,
}
