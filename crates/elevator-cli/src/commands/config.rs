//! Configuration display command.

use anyhow::Result;
use clap::ValueEnum;
use elevator_config::ElevatorConfig;

use crate::style::{print_heading, print_labeled, print_spacer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Text,
    Toml,
    Json,
}

/// Show the resolved configuration.
pub fn show(config: &ElevatorConfig, format: ConfigFormat) -> Result<()> {
    match format {
        ConfigFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigFormat::Toml => {
            print!("{}", toml::to_string_pretty(config)?);
        }
        ConfigFormat::Text => {
            print_heading("Elevator Configuration");

            println!("Scheduler:");
            print_labeled("Policy", config.scheduler.policy.as_str());
            print_labeled("Sweep end", config.scheduler.sweep_end.as_str());
            print_labeled(
                "Initial capacity",
                &config.scheduler.initial_capacity.to_string(),
            );
            print_spacer();

            let sim = &config.simulation;
            println!("Simulation:");
            print_labeled("Seed", &sim.seed.to_string());
            print_labeled("Requests", &sim.requests.to_string());
            print_labeled("Max sector", &sim.max_sector.to_string());
            print_labeled("Max length", &sim.max_length.to_string());
            print_labeled("Pattern", sim.pattern.as_str());
            print_labeled("Merge probability", &sim.merge_probability.to_string());
            print_labeled("Dispatch every", &sim.dispatch_every.to_string());
            print_spacer();

            println!("Logging:");
            print_labeled("Filter", &config.logging.filter);
        }
    }
    Ok(())
}
