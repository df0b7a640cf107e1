//! # faketimers-core
//!
//! Deterministic, virtual-time software timers for driving time-dependent
//! callback logic from unit tests.
//!
//! ### Expectations:
//! - No wall-clock dependence: time moves only through `advance_time`/`tick`
//! - Quantized stepping: one sweep per tick quantum, however large the jump
//! - Stable handles: registry growth never invalidates an issued handle
//!
//! ### Key Submodules:
//! - `clock`: `VirtualClock` using an atomic nanosecond counter
//! - `registry`: slot arena owning timers and handle validation
//! - `scheduler`: per-quantum expiry sweep
//! - `deferred`: FIFO of calls drained before each advance
//! - `engine`: `FakeTimers`, the public API tying the above together
//!
//! ```
//! use std::time::Duration;
//! use faketimers_core::prelude::*;
//!
//! let mut timers: FakeTimers<u32> = FakeTimers::new(Duration::from_millis(10));
//! let handle = timers
//!     .create("blink", Duration::from_millis(100), TimerBehavior::AutoReload, 7, |_, _, _| {})
//!     .unwrap();
//! timers.start(handle).unwrap();
//! let report = timers.advance_time(Duration::from_millis(250));
//! assert_eq!(report.fires, 2);
//! assert_eq!(timers.expiry_time(handle), Some(Duration::from_millis(300)));
//! ```

pub mod clock;
pub mod deferred;
pub mod engine;
pub mod error;
pub mod handle;
mod registry;
mod scheduler;
pub mod timer;

pub mod prelude {
    pub use crate::clock::{ClockHandle, VirtualClock};
    pub use crate::deferred::{DeferredCall, DeferredCallQueue};
    pub use crate::engine::{AdvanceReport, FakeTimers};
    pub use crate::error::TimerError;
    pub use crate::handle::TimerHandle;
    pub use crate::timer::{TimerBehavior, TimerCallback};
}

pub use engine::FakeTimers;
pub use error::TimerError;
pub use handle::TimerHandle;
pub use timer::TimerBehavior;
