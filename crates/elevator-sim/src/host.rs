//! Model host: owns the request records and drives the scheduler.
//!
//! The host plays the role of a block layer. It builds request records,
//! performs front merges on them when the scheduler reports an opportunity,
//! and checks every dispatched request against what it submitted.

use std::collections::{HashMap, HashSet, VecDeque};

use elevator::{
    Direction, MergeDecision, RequestId, RequestRef, Scheduler, SchedulerConfig, Sector, SectorCount,
    SeekPolicy, SweepEnd,
};

use crate::SimError;
use crate::invariant::{ConservationChecker, SweepChecker};
use crate::rng::SimRng;
use crate::workload::Extent;

/// A request record as the host sees it.
#[derive(Debug, Clone)]
struct HostRequest {
    handle: RequestRef,
    /// Original submissions folded into this request, including itself.
    constituents: Vec<RequestId>,
}

/// Result of one dispatch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched(RequestRef),
    /// Nothing pending.
    Idle,
    /// Requests are pending but the scheduler declined an unforced dispatch.
    Stalled,
}

/// Running counters for one simulation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostStats {
    pub merges: u64,
    /// Times a submission was held back for an occupied start sector.
    pub deferred: u64,
    pub dispatched: u64,
    pub stalls: u64,
    pub wraps: u64,
    pub reversals: u64,
    pub total_seek: u64,
    pub max_seek: u64,
    pub max_pending: u64,
}

#[derive(Debug)]
pub struct Host {
    scheduler: Scheduler,
    records: HashMap<RequestId, HostRequest>,
    /// Submissions held back because their start sector was occupied.
    deferred: VecDeque<Extent>,
    next_id: u64,
    step: u64,
    conservation: ConservationChecker,
    sweep: SweepChecker,
    /// Add order, for the FIFO baseline.
    add_order: Vec<(RequestId, Sector)>,
    dispatched_ids: HashSet<RequestId>,
    stats: HostStats,
}

impl Host {
    pub fn new(config: SchedulerConfig) -> Result<Self, SimError> {
        let scheduler = Scheduler::new(config)?;
        Ok(Self {
            sweep: SweepChecker::new(config.policy, config.sweep_end),
            scheduler,
            records: HashMap::new(),
            deferred: VecDeque::new(),
            next_id: 0,
            step: 0,
            conservation: ConservationChecker::new(),
            add_order: Vec::new(),
            dispatched_ids: HashSet::new(),
            stats: HostStats::default(),
        })
    }

    pub fn stats(&self) -> &HostStats {
        &self.stats
    }

    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn deferred(&self) -> usize {
        self.deferred.len()
    }

    pub fn head(&self) -> Sector {
        self.scheduler.last_serviced()
    }

    /// Picks a pending request's start sector at random.
    pub fn random_pending(&self, rng: &mut SimRng) -> Option<Sector> {
        let pending = self.scheduler.pending();
        if pending == 0 {
            return None;
        }
        let pick = rng.next_usize(pending);
        self.scheduler.pending_requests().nth(pick).map(|r| r.start())
    }

    /// Submits an extent: merge-checks it, then merges or queues it.
    ///
    /// An extent whose start sector is already queued is deferred and
    /// resubmitted by [`retry_deferred`](Self::retry_deferred).
    pub fn submit(&mut self, extent: Extent) -> Result<(), SimError> {
        self.step += 1;

        if self.scheduler.pending_at(extent.start).is_some() {
            tracing::trace!(start = %extent.start, "start sector occupied, deferring");
            self.deferred.push_back(extent);
            self.stats.deferred += 1;
            return Ok(());
        }

        let id = RequestId::new(self.next_id);
        self.next_id += 1;
        self.conservation.submitted(id, extent).at_step(self.step)?;

        let mut record = HostRequest {
            handle: RequestRef::new(id, extent.start, extent.length),
            constituents: vec![id],
        };

        if let MergeDecision::FrontMerge(existing) = self.scheduler.merge_check(extent.end()) {
            let Some(absorbed) = self.records.remove(&existing.id()) else {
                return Err(SimError::InvariantViolation {
                    invariant: "known_merge_target",
                    message: format!("scheduler offered {existing}, which the host never queued"),
                    step: self.step,
                });
            };
            self.scheduler.try_merged_notify(existing)?;

            let length = extent.length.as_u64().saturating_add(existing.length().as_u64());
            record.handle = RequestRef::new(id, extent.start, SectorCount::new(length));
            record.constituents.extend(absorbed.constituents);
            self.stats.merges += 1;
        }

        self.scheduler.try_add(record.handle)?;
        self.add_order.push((id, extent.start));
        self.records.insert(id, record);
        self.stats.max_pending = self.stats.max_pending.max(self.scheduler.pending() as u64);
        Ok(())
    }

    /// Resubmits every deferred extent once.
    pub fn retry_deferred(&mut self) -> Result<(), SimError> {
        for _ in 0..self.deferred.len() {
            if let Some(extent) = self.deferred.pop_front() {
                self.submit(extent)?;
            }
        }
        Ok(())
    }

    /// Asks the scheduler for the next request and "performs" it.
    pub fn dispatch(&mut self, force: bool) -> Result<DispatchOutcome, SimError> {
        self.step += 1;

        let from = self.scheduler.last_serviced();
        let direction = self.scheduler.direction();

        let Some(request) = self.scheduler.dispatch(force) else {
            if self.scheduler.is_idle() {
                return Ok(DispatchOutcome::Idle);
            }
            self.stats.stalls += 1;
            return Ok(DispatchOutcome::Stalled);
        };

        let Some(record) = self.records.remove(&request.id()) else {
            return Err(self.violation(
                "known_dispatch",
                format!("scheduler dispatched {request}, which is not queued"),
            ));
        };
        if record.handle != request {
            return Err(self.violation(
                "handle_integrity",
                format!("dispatched {request} but the host queued {}", record.handle),
            ));
        }
        if self.scheduler.last_serviced() != request.start() {
            return Err(self.violation(
                "cursor_follows_dispatch",
                format!(
                    "head at {} after dispatching {request}",
                    self.scheduler.last_serviced()
                ),
            ));
        }

        self.conservation
            .dispatched(request, &record.constituents)
            .at_step(self.step)?;

        let remaining = self
            .scheduler
            .pending_requests()
            .next()
            .zip(self.scheduler.pending_requests().last())
            .map(|(lo, hi)| (lo.start(), hi.start()));
        self.sweep
            .check(from, request.start(), direction, remaining)
            .at_step(self.step)?;

        self.record_seek(from, request.start(), direction);
        self.dispatched_ids.insert(request.id());
        Ok(DispatchOutcome::Dispatched(request))
    }

    /// Dispatches until idle, forcing past any stall, then resubmits deferred
    /// extents; repeats until nothing is left anywhere.
    pub fn drain(&mut self) -> Result<(), SimError> {
        loop {
            while let DispatchOutcome::Dispatched(_) = self.dispatch(true)? {}
            if self.deferred.is_empty() {
                return Ok(());
            }
            self.retry_deferred()?;
        }
    }

    /// Verifies conservation, shuts the scheduler down and returns the
    /// counters plus the FIFO baseline seek distance.
    pub fn finish(self) -> Result<(HostStats, u64), SimError> {
        self.conservation.drained().at_step(self.step)?;
        if !self.records.is_empty() {
            return Err(self.violation(
                "queue_drained",
                format!("{} host records still queued", self.records.len()),
            ));
        }

        let fifo_seek = self
            .add_order
            .iter()
            .filter(|(id, _)| self.dispatched_ids.contains(id))
            .fold((Sector::ZERO, 0u64), |(head, total), &(_, start)| {
                (start, total.saturating_add(head.distance(start)))
            })
            .1;

        self.scheduler.try_shutdown()?;
        Ok((self.stats, fifo_seek))
    }

    fn record_seek(&mut self, from: Sector, to: Sector, direction_before: Direction) {
        let seek = from.distance(to);
        self.stats.dispatched += 1;
        self.stats.total_seek = self.stats.total_seek.saturating_add(seek);
        self.stats.max_seek = self.stats.max_seek.max(seek);

        let config = *self.scheduler.config();
        match (config.policy, config.sweep_end) {
            (SeekPolicy::Look, SweepEnd::Reverse) => {
                if self.scheduler.direction() != direction_before {
                    self.stats.reversals += 1;
                }
            }
            (SeekPolicy::Look, _) => {
                if to < from {
                    self.stats.wraps += 1;
                }
            }
            (SeekPolicy::Sstf, _) => {}
        }
    }

    fn violation(&self, invariant: &'static str, message: String) -> SimError {
        SimError::InvariantViolation {
            invariant,
            message,
            step: self.step,
        }
    }
}
