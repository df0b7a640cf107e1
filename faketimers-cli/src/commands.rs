use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use faketimers_config::FakeTimersConfig;
use faketimers_simulator::{
    check_fire_counts, load_scenario, RandomScenario, RunReport, ScenarioRunner, TraceEvent,
};
use faketimers_telemetry::MetricsRecorder;
use tracing::info;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file; defaults to config/faketimers.yaml plus FAKETIMERS_* overrides
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario file
    Run(RunArgs),
    /// Run seeded random scenarios and check fire counts
    Fuzz(FuzzArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Scenario file; falls back to simulator.default_scenario
    #[arg(short, long)]
    pub scenario: Option<PathBuf>,
    /// Override the tick quantum, in milliseconds
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// Fail unless the run's state hash equals this value
    #[arg(long)]
    pub validate_hash: Option<String>,
    /// Print Prometheus metrics after the run
    #[arg(long, default_value_t = false)]
    pub metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FuzzArgs {
    /// Initial seed (incremented per iteration)
    #[arg(long, default_value_t = 1)]
    pub seed: u64,
    /// Number of scenarios; falls back to simulator.fuzz_iterations
    #[arg(long)]
    pub iterations: Option<usize>,
    /// Timers per scenario; falls back to simulator.fuzz_timers
    #[arg(long)]
    pub timers: Option<usize>,
    /// Steps per scenario
    #[arg(long, default_value_t = 50)]
    pub steps: usize,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<FakeTimersConfig> {
    let config = match path {
        Some(path) => FakeTimersConfig::load_from_path(path),
        None => FakeTimersConfig::load(),
    };
    config.context("loading configuration")
}

pub fn run_scenario(args: RunArgs, config: &FakeTimersConfig) -> anyhow::Result<()> {
    let path = args
        .scenario
        .or_else(|| config.simulator.default_scenario.clone())
        .context("no scenario given and simulator.default_scenario is unset")?;
    let mut scenario =
        load_scenario(&path).with_context(|| format!("loading {}", path.display()))?;
    if let Some(tick_ms) = args.tick_ms {
        scenario.tick_ms = Some(tick_ms);
    }

    let metrics = MetricsRecorder::new()?;
    let report = ScenarioRunner::new(&config.engine)
        .with_metrics(metrics.clone())
        .run(&scenario)?;
    print_report(&report);

    if args.metrics {
        print!("{}", metrics.gather_metrics()?);
    }

    if let Some(expected) = args.validate_hash.as_deref() {
        if expected != report.state_hash {
            bail!(
                "state hash mismatch: expected {}, got {}",
                expected,
                report.state_hash
            );
        }
        info!("state hash validated");
    }
    Ok(())
}

pub fn run_fuzz(args: FuzzArgs, config: &FakeTimersConfig) -> anyhow::Result<()> {
    let iterations = args.iterations.unwrap_or(config.simulator.fuzz_iterations);
    let timers = args.timers.unwrap_or(config.simulator.fuzz_timers);
    let runner = ScenarioRunner::new(&config.engine);

    for offset in 0..iterations as u64 {
        let seed = args.seed.wrapping_add(offset);
        let scenario =
            RandomScenario::new(seed, config.engine.tick_quantum_ms).generate(timers, args.steps);
        let report = runner.run(&scenario)?;
        check_fire_counts(&scenario, &report).with_context(|| {
            format!(
                "seed {} failed; scenario:\n{}",
                seed,
                scenario.to_yaml().unwrap_or_default()
            )
        })?;
    }

    println!(
        "{} scenarios passed (seeds {}..{})",
        iterations,
        args.seed,
        args.seed.wrapping_add(iterations as u64)
    );
    Ok(())
}

fn print_report(report: &RunReport) {
    for event in &report.trace {
        match event {
            TraceEvent::Fire {
                at_ms,
                handle,
                timer,
            } => println!("{:>8} ms  fire      {} (#{})", at_ms, timer, handle),
            TraceEvent::Deferred { at_ms, label } => {
                println!("{:>8} ms  deferred  {}", at_ms, label)
            }
        }
    }
    println!("fires: {}", report.total_fires());
    println!("final time: {} ms", report.final_time_ms);
    println!("state hash: {}", report.state_hash);
}
