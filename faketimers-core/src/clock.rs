//! # Virtual Clock
//!
//! A deterministic clock that only moves when the engine steps it.
//!
//! ## Expectations:
//! - Nanosecond resolution
//! - Fixed tick quantum chosen at construction
//! - Lock‑free reads through [`ClockHandle`]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Simulated time, advanced in steps of at most one tick quantum.
#[derive(Debug)]
pub struct VirtualClock {
    // Current simulation time in nanoseconds.
    offset: Arc<AtomicU64>,
    tick_quantum: Duration,
}

impl VirtualClock {
    /// Creates a clock at time zero.
    ///
    /// # Panics
    /// If `tick_quantum` is zero.
    pub fn new(tick_quantum: Duration) -> Self {
        assert!(
            !tick_quantum.is_zero(),
            "Tick quantum must be greater than zero"
        );
        Self {
            offset: Arc::new(AtomicU64::new(0)),
            tick_quantum,
        }
    }

    /// Returns the current virtual time.
    #[inline]
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.now_ns())
    }

    /// Returns the current virtual time in nanoseconds.
    #[inline]
    fn now_ns(&self) -> u64 {
        self.offset.load(Ordering::Acquire)
    }

    #[inline]
    pub fn tick_quantum(&self) -> Duration {
        self.tick_quantum
    }

    /// Moves time forward by `min(remaining, tick_quantum)` and returns the step taken.
    #[inline]
    pub fn step(&self, remaining: Duration) -> Duration {
        let step = remaining.min(self.tick_quantum);
        self.offset
            .fetch_add(step.as_nanos() as u64, Ordering::Release);
        step
    }

    /// Read-only view of this clock that can outlive a borrow of the engine.
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            offset: Arc::clone(&self.offset),
        }
    }
}

/// Observer of a [`VirtualClock`]. Cannot advance time.
#[derive(Clone, Debug)]
pub struct ClockHandle {
    offset: Arc<AtomicU64>,
}

impl ClockHandle {
    #[inline]
    pub fn now(&self) -> Duration {
        Duration::from_nanos(self.offset.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_starts_at_zero() {
        let clock = VirtualClock::new(Duration::from_millis(10));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.tick_quantum(), Duration::from_millis(10));
    }

    #[test]
    fn test_step_is_capped_by_quantum() {
        let clock = VirtualClock::new(Duration::from_millis(10));
        assert_eq!(
            clock.step(Duration::from_millis(35)),
            Duration::from_millis(10)
        );
        assert_eq!(clock.step(Duration::from_millis(5)), Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(15));
        assert_eq!(clock.now_ns(), 15_000_000);
    }

    #[test]
    fn test_zero_step_does_not_move() {
        let clock = VirtualClock::new(Duration::from_millis(1));
        assert_eq!(clock.step(Duration::ZERO), Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn test_handle_observes_steps() {
        let clock = VirtualClock::new(Duration::from_millis(10));
        let observer = clock.handle();
        clock.step(Duration::from_millis(10));
        assert_eq!(observer.now(), Duration::from_millis(10));
    }

    #[test]
    #[should_panic]
    fn test_zero_quantum() {
        VirtualClock::new(Duration::ZERO);
    }
}
