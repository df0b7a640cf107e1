//! ## faketimers-core::registry
//! **Growable slot arena owning every timer**
//!
//! Slot `i` is addressed by handle `i + 1`. Deleting a timer frees its slot
//! for reuse; the arena never shrinks, so handles stay stable across growth.

use std::time::Duration;

use crate::error::TimerError;
use crate::handle::TimerHandle;
use crate::timer::{Timer, TimerBehavior, TimerCallback};

/// A timer picked by the sweep, with its callback checked out of the slot.
pub(crate) struct DueTimer<C> {
    pub(crate) handle: TimerHandle,
    pub(crate) serial: u64,
    pub(crate) callback: TimerCallback<C>,
    pub(crate) context: C,
}

pub(crate) struct TimerRegistry<C> {
    slots: Vec<Option<Timer<C>>>,
    live: usize,
    next_serial: u64,
}

impl<C> TimerRegistry<C> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            live: 0,
            next_serial: 0,
        }
    }

    /// Number of slots, free ones included.
    #[inline]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of allocated timers.
    #[inline]
    pub(crate) fn live_count(&self) -> usize {
        self.live
    }

    /// Validates `period` against `tick_quantum` and stores a new, inactive timer
    /// in the lowest free slot.
    pub(crate) fn insert(
        &mut self,
        name: String,
        period: Duration,
        behavior: TimerBehavior,
        context: C,
        callback: TimerCallback<C>,
        tick_quantum: Duration,
    ) -> Result<TimerHandle, TimerError> {
        if period.is_zero() || period.as_nanos() % tick_quantum.as_nanos() != 0 {
            return Err(TimerError::InvalidPeriod {
                period,
                tick_quantum,
            });
        }

        let index = self
            .slots
            .iter()
            .position(Option::is_none)
            .unwrap_or(self.slots.len());
        let handle = TimerHandle::from_index(index).ok_or(TimerError::HandleSpaceExhausted)?;

        let timer = Timer {
            name,
            period,
            behavior,
            context,
            callback: Some(callback),
            next: None,
            serial: self.next_serial,
        };
        self.next_serial += 1;

        if index == self.slots.len() {
            self.slots.push(Some(timer));
        } else {
            self.slots[index] = Some(timer);
        }
        self.live += 1;
        Ok(handle)
    }

    /// Bounds rule shared by all mutators: non-zero and within the slot count.
    /// Free slots pass.
    pub(crate) fn check(&self, handle: TimerHandle) -> Result<usize, TimerError> {
        handle
            .index()
            .filter(|&index| index < self.slots.len())
            .ok_or(TimerError::InvalidHandle(handle))
    }

    /// Resets the slot to free. Succeeds for already free in-range slots.
    pub(crate) fn remove(&mut self, handle: TimerHandle) -> Result<(), TimerError> {
        let index = self.check(handle)?;
        if self.slots[index].take().is_some() {
            self.live -= 1;
        }
        Ok(())
    }

    /// Applies `f` to the timer behind `handle`. In-range free slots are a no-op.
    pub(crate) fn update<F>(&mut self, handle: TimerHandle, f: F) -> Result<(), TimerError>
    where
        F: FnOnce(&mut Timer<C>),
    {
        let index = self.check(handle)?;
        if let Some(timer) = self.slots[index].as_mut() {
            f(timer);
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn get(&self, handle: TimerHandle) -> Option<&Timer<C>> {
        self.slots.get(handle.index()?)?.as_ref()
    }

    /// Lookup for accessors that require a live handle.
    ///
    /// # Panics
    /// If `handle` does not name an allocated timer.
    pub(crate) fn expect(&self, handle: TimerHandle) -> &Timer<C> {
        match self.get(handle) {
            Some(timer) => timer,
            None => panic!("timer handle {} is not allocated", handle),
        }
    }

    /// If the timer in slot `index` is due at `now`, applies its reload policy
    /// and checks its callback out for invocation.
    pub(crate) fn take_due(&mut self, index: usize, now: Duration) -> Option<DueTimer<C>>
    where
        C: Clone,
    {
        let handle = TimerHandle::from_index(index)?;
        let timer = self.slots.get_mut(index)?.as_mut()?;
        if !timer.is_due(now) || timer.callback.is_none() {
            return None;
        }
        timer.expire(now);
        let callback = timer.callback.take()?;
        Some(DueTimer {
            handle,
            serial: timer.serial,
            callback,
            context: timer.context.clone(),
        })
    }

    /// Returns a checked-out callback, unless its timer was deleted meanwhile.
    pub(crate) fn restore_callback(&mut self, index: usize, serial: u64, callback: TimerCallback<C>) {
        if let Some(Some(timer)) = self.slots.get_mut(index) {
            if timer.serial == serial && timer.callback.is_none() {
                timer.callback = Some(callback);
            }
        }
    }
}
