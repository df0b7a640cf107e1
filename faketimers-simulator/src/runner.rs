//! Deterministic scenario execution.
//!
//! Every firing and every deferred call is appended to a trace; the trace and
//! the final timer states are folded into a BLAKE3 state hash, so two runs of
//! the same scenario always produce the same hash.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use blake3::Hasher;
use faketimers_config::EngineConfig;
use faketimers_core::prelude::*;
use faketimers_telemetry::{EventLogger, MetricsRecorder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SimulationError;
use crate::scenario::{Scenario, Step};

type Trace = Rc<RefCell<Vec<TraceEvent>>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceEvent {
    Fire {
        at_ms: u64,
        handle: u32,
        timer: String,
    },
    Deferred {
        at_ms: u64,
        label: String,
    },
}

/// State of one timer when the script ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub name: String,
    pub handle: u32,
    pub period_ms: u64,
    pub behavior: TimerBehavior,
    pub expiry_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub trace: Vec<TraceEvent>,
    pub timers: Vec<TimerState>,
    pub final_time_ms: u64,
    /// Tick quantum the run used, from the scenario or the engine config.
    pub tick_ms: u64,
    pub state_hash: String,
}

impl RunReport {
    /// Number of firings recorded for `timer`.
    pub fn fires_of(&self, timer: &str) -> usize {
        self.trace
            .iter()
            .filter(|event| matches!(event, TraceEvent::Fire { timer: t, .. } if t == timer))
            .count()
    }

    pub fn total_fires(&self) -> usize {
        self.trace
            .iter()
            .filter(|event| matches!(event, TraceEvent::Fire { .. }))
            .count()
    }
}

pub struct ScenarioRunner {
    tick_quantum: Duration,
    initial_slots: usize,
    metrics: Option<MetricsRecorder>,
}

impl ScenarioRunner {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            tick_quantum: config.tick_quantum(),
            initial_slots: config.initial_slots,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn run(&self, scenario: &Scenario) -> Result<RunReport, SimulationError> {
        let tick = scenario
            .tick_ms
            .map(Duration::from_millis)
            .unwrap_or(self.tick_quantum);
        if tick.is_zero() {
            return Err(SimulationError::Validation("tick quantum is zero".into()));
        }

        let mut engine: FakeTimers<String> = FakeTimers::with_capacity(tick, self.initial_slots);
        let trace: Trace = Rc::new(RefCell::new(Vec::new()));
        let mut handles: HashMap<String, TimerHandle> = HashMap::new();
        // Creation order, for a stable report.
        let mut order: Vec<String> = Vec::new();

        for spec in &scenario.timers {
            let sink = Rc::clone(&trace);
            let handle = engine.create(
                spec.name.clone(),
                Duration::from_millis(spec.period_ms),
                spec.behavior,
                spec.name.clone(),
                move |engine, handle, name| {
                    sink.borrow_mut().push(TraceEvent::Fire {
                        at_ms: engine.now().as_millis() as u64,
                        handle: handle.as_raw(),
                        timer: name,
                    })
                },
            )?;
            if spec.start {
                engine.start(handle)?;
            }
            handles.insert(spec.name.clone(), handle);
            order.push(spec.name.clone());
        }

        for step in &scenario.steps {
            let logged = trace.borrow().len();
            self.apply(&mut engine, &mut handles, &trace, step)?;
            if let Some(metrics) = &self.metrics {
                metrics.inc_scenario_steps();
            }
            for event in &trace.borrow()[logged..] {
                match event {
                    TraceEvent::Fire { at_ms, timer, .. } => {
                        EventLogger::log_event("fire", Duration::from_millis(*at_ms), timer)
                    }
                    TraceEvent::Deferred { at_ms, label } => {
                        EventLogger::log_event("deferred", Duration::from_millis(*at_ms), label)
                    }
                }
            }
        }

        let timers = order
            .iter()
            .filter_map(|name| handles.get(name).map(|&handle| (name, handle)))
            .map(|(name, handle)| TimerState {
                name: name.clone(),
                handle: handle.as_raw(),
                period_ms: engine.period(handle).as_millis() as u64,
                behavior: engine.behavior(handle),
                expiry_ms: engine.expiry_time(handle).map(|at| at.as_millis() as u64),
            })
            .collect::<Vec<_>>();

        let trace = trace.borrow().clone();
        let final_time_ms = engine.now().as_millis() as u64;
        let state_hash = state_hash(&trace, &timers, final_time_ms);
        info!(
            fires = trace.len(),
            final_time_ms,
            state_hash = %state_hash,
            "scenario complete"
        );

        Ok(RunReport {
            trace,
            timers,
            final_time_ms,
            tick_ms: tick.as_millis() as u64,
            state_hash,
        })
    }

    fn apply(
        &self,
        engine: &mut FakeTimers<String>,
        handles: &mut HashMap<String, TimerHandle>,
        trace: &Trace,
        step: &Step,
    ) -> Result<(), SimulationError> {
        debug!(?step, now = ?engine.now(), "scenario step");
        let lookup = |name: &str| {
            handles
                .get(name)
                .copied()
                .ok_or_else(|| SimulationError::UnknownTimer(name.to_string()))
        };

        match step {
            Step::Advance { ms } => self.record(engine.advance_time(Duration::from_millis(*ms))),
            Step::Tick => self.record(engine.tick()),
            Step::Start(name) => engine.start(lookup(name)?)?,
            Step::Stop(name) => engine.stop(lookup(name)?)?,
            Step::Reset(name) => engine.reset(lookup(name)?)?,
            Step::ChangePeriod { timer, period_ms } => {
                engine.change_period(lookup(timer)?, Duration::from_millis(*period_ms))?
            }
            Step::SetBehavior { timer, behavior } => {
                engine.set_behavior(lookup(timer)?, *behavior)?
            }
            Step::Delete(name) => {
                engine.delete(lookup(name)?)?;
                handles.remove(name);
            }
            Step::Defer { label } => {
                engine.enqueue_deferred_call(
                    |engine: &mut FakeTimers<String>, label: String, sink: Trace| {
                        sink.borrow_mut().push(TraceEvent::Deferred {
                            at_ms: engine.now().as_millis() as u64,
                            label,
                        })
                    },
                    label.clone(),
                    Rc::clone(trace),
                );
            }
        }
        Ok(())
    }

    fn record(&self, report: AdvanceReport) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_timer_fires(report.fires);
            metrics.inc_deferred_calls(report.deferred_calls);
        }
    }
}

fn state_hash(trace: &[TraceEvent], timers: &[TimerState], final_time_ms: u64) -> String {
    let mut hasher = Hasher::new();
    for event in trace {
        match event {
            TraceEvent::Fire {
                at_ms,
                handle,
                timer,
            } => hasher.update(format!("fire {} {} {}\n", at_ms, handle, timer).as_bytes()),
            TraceEvent::Deferred { at_ms, label } => {
                hasher.update(format!("deferred {} {}\n", at_ms, label).as_bytes())
            }
        };
    }
    for timer in timers {
        hasher.update(
            format!(
                "timer {} {} {} {:?} {:?}\n",
                timer.name, timer.handle, timer.period_ms, timer.behavior, timer.expiry_ms
            )
            .as_bytes(),
        );
    }
    hasher.update(&final_time_ms.to_le_bytes());
    hex::encode(hasher.finalize().as_bytes())
}
