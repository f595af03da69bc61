//! Property-based tests comparing the scheduler against the reference model.

use std::collections::HashSet;

use proptest::prelude::*;

use super::reference::ReferenceScheduler;
use crate::{
    MergeDecision, RequestId, RequestRef, RequestSet, Scheduler, SchedulerConfig, Sector,
    SectorCount, SeekPolicy, SweepEnd,
};

// ============================================================================
// Strategies
// ============================================================================

fn policy() -> impl Strategy<Value = SeekPolicy> {
    prop_oneof![Just(SeekPolicy::Look), Just(SeekPolicy::Sstf)]
}

fn sweep_end() -> impl Strategy<Value = SweepEnd> {
    prop_oneof![
        Just(SweepEnd::Wrap),
        Just(SweepEnd::Reverse),
        Just(SweepEnd::Stall)
    ]
}

/// Requests with distinct start sectors and ids equal to their position.
fn distinct_requests(max: usize) -> impl Strategy<Value = Vec<RequestRef>> {
    prop::collection::hash_set(0u64..10_000, 0..max).prop_map(|starts| {
        starts
            .into_iter()
            .enumerate()
            .map(|(i, start)| {
                RequestRef::new(
                    RequestId::new(i as u64),
                    Sector::new(start),
                    SectorCount::new(1 + start % 16),
                )
            })
            .collect()
    })
}

#[derive(Debug, Clone)]
enum Op {
    Add(u64),
    Dispatch,
    Remove(usize),
    Merge(u64),
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => (0u64..512).prop_map(Op::Add),
            3 => Just(Op::Dispatch),
            1 => any::<usize>().prop_map(Op::Remove),
            1 => (0u64..512).prop_map(Op::Merge),
        ],
        0..200,
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn find_nearest_matches_reference(
        requests in distinct_requests(64),
        target in 0u64..10_000,
        policy in policy(),
    ) {
        let mut set = RequestSet::new();
        let mut model = ReferenceScheduler::default();
        for &r in &requests {
            set.insert(r).unwrap();
            model.add(r);
        }

        let target = Sector::new(target);
        prop_assert_eq!(set.find_nearest(target, policy), model.nearest(target, policy));
    }

    #[test]
    fn dispatch_order_matches_reference(requests in distinct_requests(64), policy in policy()) {
        let mut scheduler = Scheduler::new(SchedulerConfig::new(policy)).unwrap();
        let mut model = ReferenceScheduler::default();
        for &r in &requests {
            scheduler.add(r);
            model.add(r);
        }

        for _ in 0..requests.len() {
            let got = scheduler.dispatch(false);
            prop_assert!(got.is_some());
            prop_assert_eq!(got, model.dispatch(policy));
        }
        prop_assert!(scheduler.dispatch(false).is_none());
        scheduler.shutdown();
    }

    #[test]
    fn every_added_request_dispatches_exactly_once(
        requests in distinct_requests(64),
        policy in policy(),
        sweep_end in sweep_end(),
    ) {
        let config = SchedulerConfig::new(policy).with_sweep_end(sweep_end);
        let mut scheduler = Scheduler::new(config).unwrap();
        for &r in &requests {
            scheduler.add(r);
        }

        let mut seen = HashSet::new();
        while let Some(r) = scheduler.dispatch(true) {
            prop_assert!(seen.insert(r.id()), "{} dispatched twice", r);
            prop_assert_eq!(scheduler.last_serviced(), r.start());
        }
        prop_assert_eq!(seen.len(), requests.len());
        scheduler.shutdown();
    }

    #[test]
    fn look_sweeps_upward_between_wraps(requests in distinct_requests(64)) {
        let mut scheduler = Scheduler::new(SchedulerConfig::look()).unwrap();
        for &r in &requests {
            scheduler.add(r);
        }

        let order: Vec<Sector> = std::iter::from_fn(|| scheduler.dispatch(false))
            .map(|r| r.start())
            .collect();
        // Everything is queued before the first dispatch with the head at 0,
        // so a single upward sweep must cover the whole queue.
        prop_assert!(order.windows(2).all(|w| w[0] < w[1]));
        scheduler.shutdown();
    }

    #[test]
    fn merge_check_is_pure(requests in distinct_requests(32), probe in 0u64..10_000) {
        let mut scheduler = Scheduler::new(SchedulerConfig::look()).unwrap();
        for &r in &requests {
            scheduler.add(r);
        }
        let before: Vec<RequestRef> = scheduler.pending_requests().collect();

        let first = scheduler.merge_check(Sector::new(probe));
        let second = scheduler.merge_check(Sector::new(probe));

        prop_assert_eq!(first, second);
        prop_assert_eq!(scheduler.pending_requests().collect::<Vec<_>>(), before);
        prop_assert_eq!(scheduler.last_serviced(), Sector::ZERO);

        while scheduler.dispatch(false).is_some() {}
        scheduler.shutdown();
    }

    #[test]
    fn interleaved_operations_match_reference(ops in ops(), policy in policy()) {
        let mut scheduler = Scheduler::new(SchedulerConfig::new(policy)).unwrap();
        let mut model = ReferenceScheduler::default();
        let mut next_id = 0u64;

        for op in ops {
            match op {
                Op::Add(start) => {
                    let sector = Sector::new(start);
                    if scheduler.pending_at(sector).is_some() {
                        continue;
                    }
                    let r = RequestRef::new(RequestId::new(next_id), sector, SectorCount::new(4));
                    next_id += 1;
                    scheduler.add(r);
                    model.add(r);
                }
                Op::Dispatch => {
                    prop_assert_eq!(scheduler.dispatch(false), model.dispatch(policy));
                }
                Op::Remove(pick) => {
                    let pending: Vec<RequestRef> = scheduler.pending_requests().collect();
                    if pending.is_empty() {
                        continue;
                    }
                    let victim = pending[pick % pending.len()];
                    scheduler.remove(victim);
                    model.remove(victim);
                }
                Op::Merge(candidate_end) => {
                    let end = Sector::new(candidate_end);
                    let decision = scheduler.merge_check(end);
                    prop_assert_eq!(decision.request(), model.merge_target(end));
                    if let MergeDecision::FrontMerge(existing) = decision {
                        scheduler.merged_notify(existing);
                        model.remove(existing);
                    }
                }
            }
            prop_assert_eq!(scheduler.pending(), model.len());
        }

        while scheduler.dispatch(false).is_some() {}
        scheduler.shutdown();
    }
}
