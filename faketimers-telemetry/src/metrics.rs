//! ## faketimers-telemetry::metrics
//! **Prometheus counters for simulator runs**

use prometheus::{Counter, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub timer_fires: Counter,
    pub deferred_calls: Counter,
    pub scenario_steps: Counter,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let timer_fires = Counter::new("faketimers_timer_fires_total", "Timer callbacks invoked")?;
        let deferred_calls =
            Counter::new("faketimers_deferred_calls_total", "Deferred calls drained")?;
        let scenario_steps =
            Counter::new("faketimers_scenario_steps_total", "Scenario steps executed")?;

        registry.register(Box::new(timer_fires.clone()))?;
        registry.register(Box::new(deferred_calls.clone()))?;
        registry.register(Box::new(scenario_steps.clone()))?;

        Ok(Self {
            registry,
            timer_fires,
            deferred_calls,
            scenario_steps,
        })
    }

    /// Text exposition of every registered metric.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    pub fn inc_timer_fires(&self, fires: usize) {
        self.timer_fires.inc_by(fires as f64);
    }

    pub fn inc_deferred_calls(&self, calls: usize) {
        self.deferred_calls.inc_by(calls as f64);
    }

    pub fn inc_scenario_steps(&self) {
        self.scenario_steps.inc();
    }
}
