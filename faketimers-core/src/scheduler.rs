//! ## faketimers-core::scheduler
//! **Per-quantum expiry sweep**
//!
//! Slots are visited in index order, so timers due at the same instant fire in
//! slot order. The reload policy is applied before the callback runs; whatever
//! the callback then does to any timer, its own included, stands.

use tracing::debug;

use crate::engine::FakeTimers;

/// Fires every timer due at the engine's current time. Returns the number fired.
pub(crate) fn sweep<C: Clone>(engine: &mut FakeTimers<C>) -> usize {
    let now = engine.now();
    let mut fired = 0;
    let mut index = 0;

    // Callbacks may grow the registry; re-read the slot count every iteration.
    while index < engine.registry.slot_count() {
        if let Some(due) = engine.registry.take_due(index, now) {
            let mut callback = due.callback;
            debug!(handle = %due.handle, now = ?now, "timer fired");
            callback(engine, due.handle, due.context);
            engine.registry.restore_callback(index, due.serial, callback);
            fired += 1;
        }
        index += 1;
    }

    fired
}
