//! # faketimers Telemetry
//!
//! Logging setup and Prometheus metrics for simulator runs.

pub mod logging;
pub mod metrics;

pub use logging::EventLogger;
pub use metrics::MetricsRecorder;
