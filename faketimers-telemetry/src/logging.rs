//! ## faketimers-telemetry::logging
//! **Subscriber setup and structured simulation events**
//!
//! Filtering follows `RUST_LOG`, defaulting to `info`.

use std::time::Duration;

use tracing::debug_span;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct EventLogger;

impl EventLogger {
    /// Installs the global subscriber. Later calls are ignored.
    pub fn init() {
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_span_events(FmtSpan::NONE)
            .try_init();
    }

    /// Logs one simulation event at virtual time `at`, at `debug` level.
    #[inline]
    pub fn log_event(event_type: &str, at: Duration, detail: &str) {
        let span = debug_span!("timer_event", event_type = event_type);
        let _guard = span.enter();
        tracing::debug!(at_ms = at.as_millis() as u64, detail, "Simulation event");
    }
}
