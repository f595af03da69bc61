//! # elevator-sim: Deterministic host simulator
//!
//! Drives a [`Scheduler`](elevator::Scheduler) the way a block layer would,
//! from a single seed, and checks that no request is lost, duplicated or
//! mangled by merging along the way.
//!
//! ```text
//! ┌──────────────────┐   extents   ┌──────────────────────────────────┐
//! │ WorkloadGenerator│────────────▶│ Host                             │
//! │ (SimRng fork)    │             │  merge_check → merged_notify+add │
//! └──────────────────┘             │  dispatch rounds, drain          │
//!                                  │  ConservationChecker             │
//!                                  │  SweepChecker                    │
//!                                  └───────────────┬──────────────────┘
//!                                                  ▼
//!                                              SimReport
//! ```
//!
//! A run alternates submission rounds of `dispatch_every` extents with
//! dispatch rounds of up to as many unforced dispatches, then drains the
//! queue with forced dispatches. Same seed and configuration, same report.

use elevator::{SchedulerConfig, SeekPolicy, SweepEnd};
use elevator_config::SimulationConfig;

mod error;
mod host;
pub mod invariant;
mod report;
mod rng;
pub mod workload;

pub use error::SimError;
pub use host::{DispatchOutcome, Host, HostStats};
pub use report::SimReport;
pub use rng::SimRng;
pub use workload::{Extent, WorkloadGenerator};

/// Every scheduler configuration worth comparing: LOOK with each sweep end,
/// then SSTF.
pub fn scheduler_variants(initial_capacity: usize) -> Vec<SchedulerConfig> {
    SweepEnd::ALL
        .into_iter()
        .map(|sweep_end| SchedulerConfig::look().with_sweep_end(sweep_end))
        .chain(std::iter::once(SchedulerConfig::sstf()))
        .map(|config| config.with_initial_capacity(initial_capacity))
        .collect()
}

/// One simulation run.
#[derive(Debug, Clone)]
pub struct Simulation {
    scheduler: SchedulerConfig,
    config: SimulationConfig,
}

impl Simulation {
    pub fn new(scheduler: SchedulerConfig, config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self { scheduler, config })
    }

    pub fn scheduler_config(&self) -> &SchedulerConfig {
        &self.scheduler
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Runs to completion.
    pub fn run(&self) -> Result<SimReport, SimError> {
        let config = &self.config;
        let mut rng = SimRng::new(config.seed);
        let mut workload_rng = rng.fork();
        let mut generator = WorkloadGenerator::new(config, &mut workload_rng);
        let mut host = Host::new(self.scheduler)?;

        tracing::debug!(
            seed = config.seed,
            policy = %self.scheduler.policy,
            sweep_end = %self.scheduler.sweep_end,
            pattern = %config.pattern,
            requests = config.requests,
            "simulation started"
        );

        let mut generated = 0u64;
        while generated < config.requests {
            let batch = config.dispatch_every.min(config.requests - generated);
            for _ in 0..batch {
                let extent = self
                    .merge_candidate(&host, &generator, &mut rng)
                    .unwrap_or_else(|| generator.next_extent(&mut workload_rng));
                host.submit(extent)?;
            }
            generated += batch;

            for _ in 0..config.dispatch_every {
                if !matches!(host.dispatch(false)?, DispatchOutcome::Dispatched(_)) {
                    break;
                }
            }
            host.retry_deferred()?;
        }

        tracing::debug!(
            pending = host.pending(),
            deferred = host.deferred(),
            "workload submitted, draining"
        );
        host.drain()?;

        let final_head = host.head().as_u64();
        let (stats, fifo_seek) = host.finish()?;

        let report = SimReport {
            seed: config.seed,
            policy: self.scheduler.policy,
            sweep_end: self.scheduler.sweep_end,
            pattern: config.pattern,
            requests: generated,
            dispatched: stats.dispatched,
            merges: stats.merges,
            deferred: stats.deferred,
            stalls: stats.stalls,
            wraps: stats.wraps,
            reversals: stats.reversals,
            max_pending: stats.max_pending,
            total_seek: stats.total_seek,
            max_seek: stats.max_seek,
            fifo_seek,
            final_head,
        };

        tracing::debug!(
            dispatched = report.dispatched,
            merges = report.merges,
            total_seek = report.total_seek,
            fifo_seek = report.fifo_seek,
            "simulation finished"
        );
        Ok(report)
    }

    /// With probability `merge_probability`, an extent that ends where a
    /// random pending request starts.
    fn merge_candidate(
        &self,
        host: &Host,
        generator: &WorkloadGenerator,
        rng: &mut SimRng,
    ) -> Option<Extent> {
        if !rng.next_bool_with_probability(self.config.merge_probability) {
            return None;
        }
        let target = host.random_pending(rng)?;
        generator.abutting(rng, target)
    }
}

/// Runs the same workload under every scheduler variant.
pub fn compare(
    config: &SimulationConfig,
    initial_capacity: usize,
) -> Result<Vec<SimReport>, SimError> {
    scheduler_variants(initial_capacity)
        .into_iter()
        .map(|scheduler| Simulation::new(scheduler, config.clone())?.run())
        .collect()
}

/// Convenience for the common case of a default-capacity LOOK or SSTF run.
pub fn run(policy: SeekPolicy, config: &SimulationConfig) -> Result<SimReport, SimError> {
    Simulation::new(SchedulerConfig::new(policy), config.clone())?.run()
}

#[cfg(test)]
mod tests;
