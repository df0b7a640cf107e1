//! Timer entity stored in the registry.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::engine::FakeTimers;
use crate::handle::TimerHandle;

/// What a timer does after it fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerBehavior {
    /// Fires once per start/reset, then goes inactive.
    #[default]
    SingleShot,
    /// Re-arms itself `period` after every firing.
    AutoReload,
}

/// Invoked with the engine, the firing timer's handle and a clone of its context.
pub type TimerCallback<C> = Box<dyn FnMut(&mut FakeTimers<C>, TimerHandle, C)>;

pub(crate) struct Timer<C> {
    pub(crate) name: String,
    pub(crate) period: Duration,
    pub(crate) behavior: TimerBehavior,
    pub(crate) context: C,
    // Taken out of the slot while the callback runs.
    pub(crate) callback: Option<TimerCallback<C>>,
    // Absolute due instant; `None` while inactive.
    pub(crate) next: Option<Duration>,
    // Distinguishes successive occupants of the same slot.
    pub(crate) serial: u64,
}

impl<C> Timer<C> {
    #[inline]
    pub(crate) fn is_active(&self) -> bool {
        self.next.is_some()
    }

    #[inline]
    pub(crate) fn is_due(&self, now: Duration) -> bool {
        !self.period.is_zero() && self.next.is_some_and(|next| now >= next)
    }

    /// Re-anchors expiry to `now + period`.
    #[inline]
    pub(crate) fn arm(&mut self, now: Duration) {
        self.next = Some(now + self.period);
    }

    /// Applies the post-fire policy for an expiry at `now`.
    pub(crate) fn expire(&mut self, now: Duration) {
        match self.behavior {
            TimerBehavior::AutoReload => self.arm(now),
            TimerBehavior::SingleShot => self.next = None,
        }
    }
}
