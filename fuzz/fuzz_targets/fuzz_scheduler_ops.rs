#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use elevator::{
    MergeDecision, RequestId, RequestRef, Scheduler, SchedulerConfig, Sector, SectorCount,
    SeekPolicy, SweepEnd,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Add { start: u16, length: u8 },
    Dispatch { force: bool },
    Remove { pick: u8 },
    MergeCheck { candidate_end: u16 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    sstf: bool,
    sweep_end: u8,
    ops: Vec<Op>,
}

// Drives the scheduler with arbitrary host operations, mirroring the pending
// set in a BTreeMap and checking every answer against it.
fuzz_target!(|input: Input| {
    let sweep_end = SweepEnd::ALL[input.sweep_end as usize % SweepEnd::ALL.len()];
    let policy = if input.sstf { SeekPolicy::Sstf } else { SeekPolicy::Look };
    let Ok(mut scheduler) = Scheduler::new(SchedulerConfig::new(policy).with_sweep_end(sweep_end))
    else {
        return;
    };

    let mut mirror: BTreeMap<Sector, RequestRef> = BTreeMap::new();
    let mut next_id = 0u64;

    for op in input.ops {
        match op {
            Op::Add { start, length } => {
                let request = RequestRef::new(
                    RequestId::new(next_id),
                    Sector::new(u64::from(start)),
                    SectorCount::new(u64::from(length) + 1),
                );
                next_id += 1;
                let accepted = scheduler.try_add(request).is_ok();
                assert_eq!(accepted, !mirror.contains_key(&request.start()));
                if accepted {
                    mirror.insert(request.start(), request);
                }
            }
            Op::Dispatch { force } => {
                let before = scheduler.last_serviced();
                match scheduler.dispatch(force) {
                    Some(request) => {
                        assert_eq!(mirror.remove(&request.start()), Some(request));
                        assert_eq!(scheduler.last_serviced(), request.start());
                    }
                    None => {
                        assert_eq!(scheduler.last_serviced(), before);
                        let stalled = policy == SeekPolicy::Look
                            && sweep_end == SweepEnd::Stall
                            && !force;
                        assert!(mirror.is_empty() || stalled);
                    }
                }
            }
            Op::Remove { pick } => {
                if mirror.is_empty() {
                    continue;
                }
                let victim = *mirror.values().nth(pick as usize % mirror.len()).unwrap();
                scheduler.remove(victim);
                mirror.remove(&victim.start());
            }
            Op::MergeCheck { candidate_end } => {
                let end = Sector::new(u64::from(candidate_end));
                match scheduler.merge_check(end) {
                    MergeDecision::FrontMerge(existing) => {
                        assert_eq!(mirror.get(&end), Some(&existing));
                        scheduler.merged_notify(existing);
                        mirror.remove(&end);
                    }
                    MergeDecision::NoMerge => assert!(!mirror.contains_key(&end)),
                }
            }
        }
        assert_eq!(scheduler.pending(), mirror.len());
    }

    while let Some(request) = scheduler.dispatch(true) {
        assert!(mirror.remove(&request.start()).is_some());
    }
    assert!(mirror.is_empty());
    scheduler.shutdown();
});
