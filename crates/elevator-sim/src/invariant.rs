//! Invariant checkers for simulation runs.
//!
//! # Available Checkers
//!
//! - [`ConservationChecker`]: every submitted extent is serviced exactly once,
//!   either directly or as part of a merge survivor
//! - [`SweepChecker`]: LOOK never moves backward while requests remain ahead

use std::collections::HashMap;

use elevator::{Direction, RequestId, RequestRef, Sector, SeekPolicy, SweepEnd};

use crate::SimError;
use crate::workload::Extent;

// ============================================================================
// Invariant Result
// ============================================================================

/// Result of an invariant check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantResult {
    Ok,
    Violated {
        invariant: &'static str,
        message: String,
    },
}

impl InvariantResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, InvariantResult::Ok)
    }

    /// Converts to a `SimError` if violated.
    pub fn into_error(self, step: u64) -> Option<SimError> {
        match self {
            InvariantResult::Ok => None,
            InvariantResult::Violated { invariant, message } => Some(SimError::InvariantViolation {
                invariant,
                message,
                step,
            }),
        }
    }

    /// Converts into a `Result` so checks compose with `?`.
    pub fn at_step(self, step: u64) -> Result<(), SimError> {
        match self.into_error(step) {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}

// ============================================================================
// Conservation Checker
// ============================================================================

/// Tracks every accepted submission until it is serviced.
#[derive(Debug, Default)]
pub struct ConservationChecker {
    outstanding: HashMap<RequestId, Extent>,
    accepted: u64,
    serviced: u64,
}

impl ConservationChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn serviced(&self) -> u64 {
        self.serviced
    }

    pub fn submitted(&mut self, id: RequestId, extent: Extent) -> InvariantResult {
        if self.outstanding.insert(id, extent).is_some() {
            return InvariantResult::Violated {
                invariant: "unique_request_id",
                message: format!("{id} submitted twice"),
            };
        }
        self.accepted += 1;
        InvariantResult::Ok
    }

    /// Checks a dispatched request against the submissions it covers.
    ///
    /// `constituents` are the original submissions the host coalesced into
    /// `dispatched`; they must tile its extent exactly.
    pub fn dispatched(
        &mut self,
        dispatched: RequestRef,
        constituents: &[RequestId],
    ) -> InvariantResult {
        let mut extents = Vec::with_capacity(constituents.len());
        for id in constituents {
            match self.outstanding.remove(id) {
                Some(extent) => extents.push(extent),
                None => {
                    return InvariantResult::Violated {
                        invariant: "serviced_exactly_once",
                        message: format!("{id} serviced twice or never submitted (via {dispatched})"),
                    };
                }
            }
        }

        extents.sort_by_key(|e| e.start);
        let mut cursor = dispatched.start();
        for extent in &extents {
            if extent.start != cursor {
                return InvariantResult::Violated {
                    invariant: "merge_coverage",
                    message: format!(
                        "{dispatched} has a gap or overlap at sector {cursor} (next piece starts at {})",
                        extent.start
                    ),
                };
            }
            cursor = extent.end();
        }
        if cursor != dispatched.end() {
            return InvariantResult::Violated {
                invariant: "merge_coverage",
                message: format!("{dispatched} pieces end at sector {cursor}"),
            };
        }

        self.serviced += constituents.len() as u64;
        InvariantResult::Ok
    }

    /// Checks that nothing accepted is still waiting.
    pub fn drained(&self) -> InvariantResult {
        if self.outstanding.is_empty() && self.accepted == self.serviced {
            return InvariantResult::Ok;
        }
        InvariantResult::Violated {
            invariant: "queue_drained",
            message: format!(
                "{} of {} accepted requests never serviced",
                self.outstanding.len(),
                self.accepted
            ),
        }
    }
}

// ============================================================================
// Sweep Checker
// ============================================================================

/// Verifies that LOOK only turns back once nothing remains ahead.
#[derive(Debug)]
pub struct SweepChecker {
    policy: SeekPolicy,
    sweep_end: SweepEnd,
}

impl SweepChecker {
    pub fn new(policy: SeekPolicy, sweep_end: SweepEnd) -> Self {
        Self { policy, sweep_end }
    }

    /// Checks one dispatch.
    ///
    /// `remaining` is the lowest and highest pending sector after the
    /// dispatch, if anything is still pending.
    pub fn check(
        &self,
        from: Sector,
        to: Sector,
        direction_before: Direction,
        remaining: Option<(Sector, Sector)>,
    ) -> InvariantResult {
        if self.policy == SeekPolicy::Sstf {
            return InvariantResult::Ok;
        }
        let Some((lowest, highest)) = remaining else {
            return InvariantResult::Ok;
        };

        let skipped = match (self.sweep_end, direction_before) {
            (SweepEnd::Reverse, Direction::Descending) => to > from && lowest <= from,
            _ => to < from && highest >= from,
        };
        if skipped {
            return InvariantResult::Violated {
                invariant: "look_sweep_order",
                message: format!(
                    "head turned back from {from} to {to} with requests still ahead (pending {lowest}..={highest})"
                ),
            };
        }
        InvariantResult::Ok
    }
}
