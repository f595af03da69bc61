//! `elevator`: run and compare block request scheduling policies.
//!
//! # Quick Start
//!
//! ```bash
//! # One LOOK run with the configured workload
//! elevator sim
//!
//! # SSTF on a hotspot workload, as JSON
//! elevator sim --policy sstf --pattern hotspot --format json
//!
//! # Every scheduler variant on the same seed
//! elevator compare --seed 7 -n 50000
//!
//! # Show the resolved configuration
//! elevator config --format toml
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use elevator::{SeekPolicy, SweepEnd};
use elevator_config::{ConfigLoader, ElevatorConfig};
use tracing_subscriber::EnvFilter;

use commands::config::ConfigFormat;
use commands::sim::{ReportFormat, WorkloadArgs};

/// Elevator - seek-ordering block request scheduler simulator.
#[derive(Parser)]
#[command(name = "elevator")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    /// Project directory to read elevator.toml and elevator.local.toml from.
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Read this TOML file instead of the layered configuration.
    #[arg(short, long, global = true, conflicts_with = "project")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Run one deterministic simulation.
    Sim {
        /// Seek policy (look, sstf).
        #[arg(long)]
        policy: Option<SeekPolicy>,

        /// What LOOK does past the last pending sector (wrap, reverse, stall).
        #[arg(long)]
        sweep_end: Option<SweepEnd>,

        #[command(flatten)]
        workload: WorkloadArgs,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Run every scheduler variant on the same workload and tabulate them.
    Compare {
        #[command(flatten)]
        workload: WorkloadArgs,

        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// Show the resolved configuration.
    Config {
        /// Output format.
        #[arg(short, long, value_enum, default_value = "text")]
        format: ConfigFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    style::set_no_color(cli.no_color);

    if let Commands::Version = cli.command {
        commands::version::run();
        return Ok(());
    }

    let config = load_config(&cli)?;
    init_logging(&config.logging.filter)?;
    tracing::debug!(policy = %config.scheduler.policy, "configuration loaded");

    match cli.command {
        Commands::Version => Ok(()),
        Commands::Sim {
            policy,
            sweep_end,
            workload,
            format,
        } => commands::sim::run(&config, policy, sweep_end, &workload, format),
        Commands::Compare { workload, format } => {
            commands::sim::compare(&config, &workload, format)
        }
        Commands::Config { format } => commands::config::show(&config, format),
    }
}

fn load_config(cli: &Cli) -> Result<ElevatorConfig> {
    if let Some(path) = &cli.config {
        return ElevatorConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    let mut loader = ConfigLoader::new();
    if let Some(project) = &cli.project {
        loader = loader.with_project_dir(project);
    }
    loader.load()
}

/// `RUST_LOG` wins; otherwise the configured filter. Logs go to stderr so
/// JSON on stdout stays parseable.
fn init_logging(filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter)
            .with_context(|| format!("Invalid logging filter {filter:?}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}
