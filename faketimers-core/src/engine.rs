//! ## faketimers-core::engine
//! **Single owner of the clock, the timer registry and the deferred queue**
//!
//! `FakeTimers` is not thread-safe and is meant to be driven from one test
//! thread. Callbacks receive `&mut FakeTimers` and may call any operation,
//! including on the timer that is firing.

use std::fmt;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::clock::{ClockHandle, VirtualClock};
use crate::deferred::{DeferredCall, DeferredCallQueue};
use crate::error::TimerError;
use crate::handle::TimerHandle;
use crate::registry::TimerRegistry;
use crate::scheduler;
use crate::timer::TimerBehavior;

const DEFAULT_SLOTS: usize = 8;

/// What one `advance_time` call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Deferred calls drained before stepping.
    pub deferred_calls: usize,
    /// Clock steps taken.
    pub steps: usize,
    /// Timer callbacks invoked.
    pub fires: usize,
}

pub struct FakeTimers<C> {
    pub(crate) clock: VirtualClock,
    pub(crate) registry: TimerRegistry<C>,
    deferred: DeferredCallQueue<FakeTimers<C>>,
}

impl<C> fmt::Debug for FakeTimers<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeTimers")
            .field("now", &self.clock.now())
            .field("tick_quantum", &self.clock.tick_quantum())
            .field("timers", &self.registry.live_count())
            .field("slots", &self.registry.slot_count())
            .field("pending_deferred_calls", &self.deferred.len())
            .finish()
    }
}

impl<C: Clone> FakeTimers<C> {
    /// Creates an engine at virtual time zero.
    ///
    /// # Panics
    /// If `tick_quantum` is zero.
    pub fn new(tick_quantum: Duration) -> Self {
        Self::with_capacity(tick_quantum, DEFAULT_SLOTS)
    }

    /// Like [`FakeTimers::new`], with room for `slots` timers before the registry grows.
    pub fn with_capacity(tick_quantum: Duration, slots: usize) -> Self {
        Self {
            clock: VirtualClock::new(tick_quantum),
            registry: TimerRegistry::with_capacity(slots),
            deferred: DeferredCallQueue::new(),
        }
    }

    /// Creates an inactive timer.
    ///
    /// `period` must be a non-zero multiple of the tick quantum.
    pub fn create<F>(
        &mut self,
        name: impl Into<String>,
        period: Duration,
        behavior: TimerBehavior,
        context: C,
        callback: F,
    ) -> Result<TimerHandle, TimerError>
    where
        F: FnMut(&mut FakeTimers<C>, TimerHandle, C) + 'static,
    {
        let name = name.into();
        match self.registry.insert(
            name.clone(),
            period,
            behavior,
            context,
            Box::new(callback),
            self.clock.tick_quantum(),
        ) {
            Ok(handle) => {
                debug!(%handle, name = %name, ?period, ?behavior, "timer created");
                Ok(handle)
            }
            Err(err) => {
                warn!(name = %name, error = %err, "timer creation rejected");
                Err(err)
            }
        }
    }

    /// Frees the timer's slot. Deleting an in-range free slot succeeds.
    pub fn delete(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        self.registry.remove(handle)?;
        debug!(%handle, "timer deleted");
        Ok(())
    }

    /// Arms the timer to fire one period from now, whatever its prior state.
    pub fn start(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        let now = self.now();
        self.registry.update(handle, |timer| timer.arm(now))?;
        debug!(%handle, ?now, "timer started");
        Ok(())
    }

    pub fn stop(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        self.registry.update(handle, |timer| timer.next = None)?;
        debug!(%handle, "timer stopped");
        Ok(())
    }

    /// Same as [`FakeTimers::start`].
    pub fn reset(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        self.start(handle)
    }

    /// Sets a new period and re-anchors expiry to `now + period`, activating the timer.
    pub fn change_period(&mut self, handle: TimerHandle, period: Duration) -> Result<(), TimerError> {
        if period.is_zero() {
            return Err(TimerError::InvalidPeriod {
                period,
                tick_quantum: self.clock.tick_quantum(),
            });
        }
        let now = self.now();
        self.registry.update(handle, |timer| {
            timer.period = period;
            timer.arm(now);
        })?;
        debug!(%handle, ?period, "timer period changed");
        Ok(())
    }

    pub fn set_behavior(&mut self, handle: TimerHandle, behavior: TimerBehavior) -> Result<(), TimerError> {
        self.registry.update(handle, |timer| timer.behavior = behavior)
    }

    pub fn set_context(&mut self, handle: TimerHandle, context: C) -> Result<(), TimerError> {
        self.registry.update(handle, |timer| timer.context = context)
    }

    /// # Panics
    /// If `handle` is not a live timer. Applies to every accessor below.
    pub fn behavior(&self, handle: TimerHandle) -> TimerBehavior {
        self.registry.expect(handle).behavior
    }

    pub fn context(&self, handle: TimerHandle) -> &C {
        &self.registry.expect(handle).context
    }

    pub fn name(&self, handle: TimerHandle) -> &str {
        &self.registry.expect(handle).name
    }

    pub fn period(&self, handle: TimerHandle) -> Duration {
        self.registry.expect(handle).period
    }

    /// Absolute instant of the next firing, `None` if the timer is inactive.
    pub fn expiry_time(&self, handle: TimerHandle) -> Option<Duration> {
        self.registry.expect(handle).next
    }

    /// True iff `handle` names a live, armed timer. Never panics.
    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.registry.get(handle).is_some_and(|timer| timer.is_active())
    }

    /// Queues `function(engine, context, parameter)` for the start of the next
    /// time advance. Always succeeds.
    pub fn enqueue_deferred_call<F, X, P>(&self, function: F, context: X, parameter: P) -> bool
    where
        F: FnOnce(&mut FakeTimers<C>, X, P) + 'static,
        X: 'static,
        P: 'static,
    {
        self.deferred
            .call_enqueue(DeferredCall::new(function, context, parameter))
    }

    /// Drains deferred calls, then moves time forward by `amount` one quantum at a
    /// time, sweeping after every step.
    pub fn advance_time(&mut self, amount: Duration) -> AdvanceReport {
        let mut report = AdvanceReport {
            deferred_calls: self.drain_deferred_calls(),
            ..AdvanceReport::default()
        };

        let mut remaining = amount;
        while !remaining.is_zero() {
            remaining -= self.clock.step(remaining);
            trace!(now = ?self.clock.now(), "clock step");
            report.steps += 1;
            report.fires += scheduler::sweep(self);
        }

        trace!(?amount, ?report, now = ?self.now(), "time advanced");
        report
    }

    /// Exactly `advance_time(tick_quantum)`.
    pub fn tick(&mut self) -> AdvanceReport {
        self.advance_time(self.clock.tick_quantum())
    }

    #[inline]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    #[inline]
    pub fn tick_quantum(&self) -> Duration {
        self.clock.tick_quantum()
    }

    pub fn clock_handle(&self) -> ClockHandle {
        self.clock.handle()
    }

    /// Live timers.
    pub fn timer_count(&self) -> usize {
        self.registry.live_count()
    }

    /// Registry slots, free ones included.
    pub fn slot_count(&self) -> usize {
        self.registry.slot_count()
    }

    pub fn pending_deferred_calls(&self) -> usize {
        self.deferred.len()
    }

    // Runs until the queue is empty, so calls enqueued while draining run too.
    fn drain_deferred_calls(&mut self) -> usize {
        let mut drained = 0;
        while let Some(call) = self.deferred.call_dequeue() {
            trace!(index = drained, "deferred call");
            call.invoke(self);
            drained += 1;
        }
        drained
    }
}
