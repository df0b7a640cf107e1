use std::fmt;

/// Opaque timer identifier. Zero is reserved and never names a timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u32);

impl TimerHandle {
    /// The "no timer" sentinel.
    pub const INVALID: TimerHandle = TimerHandle(0);

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Handle for registry slot `index` (handles are 1-based).
    pub(crate) fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index + 1).ok().map(Self)
    }

    /// Registry slot for this handle, `None` for the sentinel.
    #[inline]
    pub(crate) fn index(self) -> Option<usize> {
        (self.0 as usize).checked_sub(1)
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TimerHandle> for u32 {
    fn from(handle: TimerHandle) -> Self {
        handle.0
    }
}
