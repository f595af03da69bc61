//! Simulation commands: a single run, or every scheduler variant side by side.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use elevator::{SchedulerConfig, SeekPolicy, SweepEnd};
use elevator_config::{ElevatorConfig, SimulationConfig, WorkloadPattern};
use elevator_sim::{SimReport, Simulation};

use crate::style::{print_error, print_heading, print_info_table, print_success, results_table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Workload overrides shared by `sim` and `compare`.
#[derive(Debug, Clone, Args)]
pub struct WorkloadArgs {
    /// Seed for the deterministic RNG.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of requests to generate.
    #[arg(short = 'n', long)]
    pub requests: Option<u64>,

    /// Device size in sectors.
    #[arg(long)]
    pub max_sector: Option<u64>,

    /// Longest request in sectors.
    #[arg(long)]
    pub max_length: Option<u64>,

    /// Sector access pattern (uniform, sequential, hotspot).
    #[arg(short, long)]
    pub pattern: Option<WorkloadPattern>,

    /// Chance of generating a request that front-merges with a pending one.
    #[arg(long)]
    pub merge_probability: Option<f64>,

    /// Requests submitted per round before dispatching.
    #[arg(long)]
    pub dispatch_every: Option<u64>,
}

impl WorkloadArgs {
    fn apply(&self, base: &SimulationConfig) -> SimulationConfig {
        SimulationConfig {
            seed: self.seed.unwrap_or(base.seed),
            requests: self.requests.unwrap_or(base.requests),
            max_sector: self.max_sector.unwrap_or(base.max_sector),
            max_length: self.max_length.unwrap_or(base.max_length),
            pattern: self.pattern.unwrap_or(base.pattern),
            merge_probability: self.merge_probability.unwrap_or(base.merge_probability),
            dispatch_every: self.dispatch_every.unwrap_or(base.dispatch_every),
        }
    }
}

/// Run one simulation.
pub fn run(
    config: &ElevatorConfig,
    policy: Option<SeekPolicy>,
    sweep_end: Option<SweepEnd>,
    workload: &WorkloadArgs,
    format: ReportFormat,
) -> Result<()> {
    let scheduler = SchedulerConfig {
        policy: policy.unwrap_or(config.scheduler.policy),
        sweep_end: sweep_end.unwrap_or(config.scheduler.sweep_end),
        ..config.scheduler
    };
    let simulation = Simulation::new(scheduler, workload.apply(&config.simulation))
        .context("Invalid simulation parameters")?;

    let report = match simulation.run() {
        Ok(report) => report,
        Err(e) => {
            print_error(&format!("{e}"));
            bail!(
                "simulation failed (seed {})",
                simulation.config().seed
            );
        }
    };

    match format {
        ReportFormat::Json => println!("{}", report.to_json()?),
        ReportFormat::Text => print_report(&report),
    }
    Ok(())
}

/// Run every scheduler variant on the same workload.
pub fn compare(config: &ElevatorConfig, workload: &WorkloadArgs, format: ReportFormat) -> Result<()> {
    let sim_config = workload.apply(&config.simulation);
    sim_config
        .validate()
        .context("Invalid simulation parameters")?;

    let reports = match elevator_sim::compare(&sim_config, config.scheduler.initial_capacity) {
        Ok(reports) => reports,
        Err(e) => {
            print_error(&format!("{e}"));
            bail!("comparison failed (seed {})", sim_config.seed);
        }
    };

    match format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        ReportFormat::Text => {
            print_heading(&format!(
                "{} requests, {} pattern, seed {}",
                sim_config.requests, sim_config.pattern, sim_config.seed
            ));
            println!("{}", comparison_table(&reports));
        }
    }
    Ok(())
}

fn print_report(report: &SimReport) {
    print_heading(&format!(
        "Simulation: {}, {} pattern, seed {}",
        report.label(),
        report.pattern,
        report.seed
    ));

    print_info_table(&[
        ("Requests", report.requests.to_string()),
        ("Dispatched", report.dispatched.to_string()),
        ("Front merges", report.merges.to_string()),
        ("Deferred", report.deferred.to_string()),
        ("Peak queue depth", report.max_pending.to_string()),
        ("Total seek", report.total_seek.to_string()),
        ("Mean seek", format!("{:.1}", report.mean_seek())),
        ("Max seek", report.max_seek.to_string()),
        ("FIFO seek", report.fifo_seek.to_string()),
        ("vs FIFO", format!("{:.1}%", report.seek_ratio() * 100.0)),
        ("Wraps", report.wraps.to_string()),
        ("Reversals", report.reversals.to_string()),
        ("Stalls", report.stalls.to_string()),
        ("Final head", report.final_head.to_string()),
    ]);
    println!();
    print_success("all requests serviced exactly once");
}

fn comparison_table(reports: &[SimReport]) -> comfy_table::Table {
    let rows: Vec<Vec<String>> = reports
        .iter()
        .map(|r| {
            vec![
                r.label(),
                r.dispatched.to_string(),
                r.merges.to_string(),
                r.total_seek.to_string(),
                format!("{:.1}", r.mean_seek()),
                r.max_seek.to_string(),
                format!("{:.1}%", r.seek_ratio() * 100.0),
                r.wraps.to_string(),
                r.reversals.to_string(),
                r.stalls.to_string(),
            ]
        })
        .collect();

    results_table(
        &[
            "scheduler",
            "dispatched",
            "merges",
            "total seek",
            "mean seek",
            "max seek",
            "vs fifo",
            "wraps",
            "reversals",
            "stalls",
        ],
        &rows,
    )
}
