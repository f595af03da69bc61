//! Run summaries.

use elevator::{SeekPolicy, SweepEnd};
use elevator_config::WorkloadPattern;
use serde::Serialize;

/// Outcome of one simulation run.
///
/// Seek distances are in sectors, measured between consecutive dispatched
/// start sectors with the head starting at sector 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimReport {
    pub seed: u64,
    pub policy: SeekPolicy,
    pub sweep_end: SweepEnd,
    pub pattern: WorkloadPattern,
    /// Extents generated by the workload.
    pub requests: u64,
    /// Requests handed to the device. Lower than `requests` by `merges`.
    pub dispatched: u64,
    pub merges: u64,
    pub deferred: u64,
    /// Unforced dispatches declined while requests were pending.
    pub stalls: u64,
    pub wraps: u64,
    pub reversals: u64,
    pub max_pending: u64,
    pub total_seek: u64,
    pub max_seek: u64,
    /// Seek distance had the same requests been serviced in arrival order.
    pub fifo_seek: u64,
    pub final_head: u64,
}

impl SimReport {
    pub fn mean_seek(&self) -> f64 {
        if self.dispatched == 0 {
            return 0.0;
        }
        self.total_seek as f64 / self.dispatched as f64
    }

    /// Total seek as a fraction of the FIFO baseline (lower is better).
    pub fn seek_ratio(&self) -> f64 {
        if self.fifo_seek == 0 {
            return 1.0;
        }
        self.total_seek as f64 / self.fifo_seek as f64
    }

    /// Label for the scheduler configuration, e.g. `look/wrap` or `sstf`.
    pub fn label(&self) -> String {
        match self.policy {
            SeekPolicy::Look => format!("{}/{}", self.policy, self.sweep_end),
            SeekPolicy::Sstf => self.policy.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
