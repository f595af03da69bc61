//! The dispatcher: cursor bookkeeping and policy-driven selection.
//!
//! A [`Scheduler`] is created per device queue. The host feeds it requests and
//! asks it for the next one to service; the scheduler tracks where the head
//! was last sent (`last_serviced`) and picks the following request according
//! to its fixed [`SeekPolicy`] and [`SweepEnd`].
//!
//! # Host Protocol
//!
//! ```text
//!   new request ──▶ merge_check(end) ──┬─ FrontMerge(existing) ──▶ host merges,
//!                                      │                           merged_notify(existing)
//!                                      └─ NoMerge ──────────────▶ add(request)
//!
//!   device ready ──▶ dispatch(force) ──┬─ Some(request) ──▶ host performs the I/O
//!                                      └─ None ──────────▶ idle
//! ```
//!
//! The scheduler does no locking. A host sharing it between threads must hold
//! its own lock across `merge_check` and the `add` or merge that follows.
//!
//! # Fatal Errors
//!
//! `add`, `merged_notify`, `remove` and `shutdown` panic when the host hands
//! back a request the scheduler does not hold, queues two requests at one
//! sector, or tears down a non-empty queue. Continuing after any of those
//! would dispatch a request twice or lose one. The `try_*` variants report
//! the same conditions as [`ElevatorError`] instead.

use elevator_types::{Direction, RequestRef, SchedulerConfig, Sector, SeekPolicy, SweepEnd};

use crate::merge::{self, MergeDecision};
use crate::{ElevatorError, RequestSet};

/// Seek-ordering request scheduler for one device queue.
#[derive(Debug)]
pub struct Scheduler {
    requests: RequestSet,
    /// Start sector of the most recently dispatched request.
    last_serviced: Sector,
    /// Current sweep direction. Only changes under `SweepEnd::Reverse`.
    direction: Direction,
    config: SchedulerConfig,
    retired: bool,
}

impl Scheduler {
    /// Creates an idle scheduler with the head at sector 0.
    ///
    /// # Errors
    ///
    /// Returns [`ElevatorError::Allocation`] if the configured initial
    /// capacity cannot be reserved. No partially built scheduler is returned.
    pub fn new(config: SchedulerConfig) -> Result<Self, ElevatorError> {
        let requests = RequestSet::with_capacity(config.initial_capacity)?;

        tracing::debug!(
            policy = %config.policy,
            sweep_end = %config.sweep_end,
            initial_capacity = config.initial_capacity,
            "scheduler initialized"
        );

        Ok(Self {
            requests,
            last_serviced: Sector::ZERO,
            direction: Direction::Ascending,
            config,
            retired: false,
        })
    }

    pub fn policy(&self) -> SeekPolicy {
        self.config.policy
    }

    pub fn sweep_end(&self) -> SweepEnd {
        self.config.sweep_end
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Sector the head was last sent to.
    pub fn last_serviced(&self) -> Sector {
        self.last_serviced
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Number of queued requests.
    pub fn pending(&self) -> usize {
        self.requests.len()
    }

    /// Returns `true` when nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.requests.is_empty()
    }

    /// Queued requests in ascending sector order.
    pub fn pending_requests(&self) -> impl Iterator<Item = RequestRef> + '_ {
        self.requests.iter()
    }

    /// Returns the queued request starting at `sector`, if any.
    pub fn pending_at(&self, sector: Sector) -> Option<RequestRef> {
        self.requests.get(sector)
    }

    /// Queues a request.
    ///
    /// The host must have run [`merge_check`](Self::merge_check) for it first.
    ///
    /// # Panics
    ///
    /// Panics if a request is already queued at the same start sector.
    #[track_caller]
    pub fn add(&mut self, request: RequestRef) {
        if let Err(e) = self.try_add(request) {
            fatal(&e);
        }
    }

    /// Queues a request, reporting a sector collision as an error.
    pub fn try_add(&mut self, request: RequestRef) -> Result<(), ElevatorError> {
        self.requests.insert(request)?;

        tracing::trace!(
            id = %request.id(),
            start = %request.start(),
            length = %request.length(),
            pending = self.requests.len(),
            "request queued"
        );
        Ok(())
    }

    /// Checks whether a candidate ending at `candidate_end` can be
    /// front-merged into a queued request.
    pub fn merge_check(&self, candidate_end: Sector) -> MergeDecision {
        let decision = merge::merge_check(&self.requests, candidate_end);

        tracing::trace!(
            candidate_end = %candidate_end,
            merge = decision.is_merge(),
            "merge check"
        );
        decision
    }

    /// Records that the host absorbed `absorbed` into another request.
    ///
    /// # Panics
    ///
    /// Panics if `absorbed` is not the request queued at its start sector.
    #[track_caller]
    pub fn merged_notify(&mut self, absorbed: RequestRef) {
        if let Err(e) = self.try_merged_notify(absorbed) {
            fatal(&e);
        }
    }

    pub fn try_merged_notify(&mut self, absorbed: RequestRef) -> Result<(), ElevatorError> {
        merge::merged_notify(&mut self.requests, absorbed)?;

        tracing::trace!(
            id = %absorbed.id(),
            start = %absorbed.start(),
            pending = self.requests.len(),
            "request absorbed by merge"
        );
        Ok(())
    }

    /// Withdraws a queued request that will not be serviced.
    ///
    /// # Panics
    ///
    /// Panics if `request` is not the request queued at its start sector.
    #[track_caller]
    pub fn remove(&mut self, request: RequestRef) {
        if let Err(e) = self.try_remove(request) {
            fatal(&e);
        }
    }

    pub fn try_remove(&mut self, request: RequestRef) -> Result<(), ElevatorError> {
        self.requests.remove(request)?;

        tracing::trace!(
            id = %request.id(),
            start = %request.start(),
            pending = self.requests.len(),
            "request withdrawn"
        );
        Ok(())
    }

    /// Removes and returns the next request to service.
    ///
    /// Returns `None` when idle. Under LOOK with [`SweepEnd::Stall`], also
    /// returns `None` when nothing lies at or past the head, unless `force`
    /// is set. `force` has no effect under any other configuration.
    ///
    /// On success the head moves to the dispatched request's start sector.
    pub fn dispatch(&mut self, force: bool) -> Option<RequestRef> {
        let next = self.select(force)?;
        self.take(next);

        let from = self.last_serviced;
        self.last_serviced = next.start();

        tracing::trace!(
            id = %next.id(),
            from = %from,
            to = %next.start(),
            seek = from.distance(next.start()),
            pending = self.requests.len(),
            "request dispatched"
        );
        Some(next)
    }

    /// Tears the scheduler down.
    ///
    /// # Panics
    ///
    /// Panics if any request is still queued: the host has lost track of it.
    #[track_caller]
    pub fn shutdown(self) {
        if let Err(e) = self.try_shutdown() {
            fatal(&e);
        }
    }

    pub fn try_shutdown(mut self) -> Result<(), ElevatorError> {
        self.retired = true;

        let pending = self.requests.len();
        if pending > 0 {
            return Err(ElevatorError::PendingAtShutdown { pending });
        }

        tracing::debug!(last_serviced = %self.last_serviced, "scheduler shut down");
        Ok(())
    }

    /// Unlinks a request chosen for dispatch.
    ///
    /// # Panics
    ///
    /// Panics if `request` is not queued, which means selection and the
    /// request set disagree.
    #[track_caller]
    pub(crate) fn take(&mut self, request: RequestRef) {
        if let Err(e) = self.requests.delete(request) {
            fatal(&e);
        }
    }

    fn select(&mut self, force: bool) -> Option<RequestRef> {
        let cursor = self.last_serviced;

        match (self.config.policy, self.config.sweep_end) {
            (SeekPolicy::Sstf, _) => self.requests.find_nearest(cursor, SeekPolicy::Sstf),
            (SeekPolicy::Look, SweepEnd::Wrap) => {
                let next = self.requests.find_nearest(cursor, SeekPolicy::Look)?;
                if next.start() < cursor {
                    tracing::debug!(from = %cursor, to = %next.start(), "sweep wrapped");
                }
                Some(next)
            }
            (SeekPolicy::Look, SweepEnd::Stall) => {
                if let Some(next) = self.requests.ceiling(cursor) {
                    return Some(next);
                }
                if !force {
                    return None;
                }
                let next = self.requests.first()?;
                tracing::debug!(from = %cursor, to = %next.start(), "forced sweep wrap");
                Some(next)
            }
            (SeekPolicy::Look, SweepEnd::Reverse) => {
                if let Some(next) = self.ahead(cursor) {
                    return Some(next);
                }
                let next = self.requests.first()?;
                self.direction = self.direction.reversed();
                tracing::debug!(at = %cursor, direction = %self.direction, "sweep reversed");
                // Nothing was ahead, so every queued request lies behind the head.
                Some(self.ahead(cursor).unwrap_or(next))
            }
        }
    }

    /// Nearest request at or past `cursor` in the current direction.
    fn ahead(&self, cursor: Sector) -> Option<RequestRef> {
        match self.direction {
            Direction::Ascending => self.requests.ceiling(cursor),
            Direction::Descending => self.requests.floor(cursor),
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if !self.retired && !self.requests.is_empty() {
            tracing::error!(
                pending = self.requests.len(),
                "scheduler dropped without shutdown while requests are pending"
            );
        }
    }
}

#[track_caller]
fn fatal(error: &ElevatorError) -> ! {
    tracing::error!(error = %error, "scheduler invariant violated");
    panic!("{error}");
}
