//! Simulation-level tests: determinism, conservation across every scheduler
//! variant, and report sanity.

use elevator::{SchedulerConfig, SeekPolicy, SweepEnd};
use elevator_config::{SimulationConfig, WorkloadPattern};
use proptest::prelude::*;
use test_case::test_case;

use crate::{SimError, Simulation, compare, run, scheduler_variants};

fn small(seed: u64, pattern: WorkloadPattern) -> SimulationConfig {
    SimulationConfig {
        seed,
        requests: 2_000,
        max_sector: 100_000,
        max_length: 64,
        pattern,
        merge_probability: 0.2,
        dispatch_every: 16,
    }
}

#[test]
fn same_seed_produces_identical_reports() {
    let config = small(1234, WorkloadPattern::Hotspot);
    let a = run(SeekPolicy::Look, &config).expect("first run");
    let b = run(SeekPolicy::Look, &config).expect("second run");
    assert_eq!(a, b);
}

#[test]
fn different_seeds_produce_different_runs() {
    let a = run(SeekPolicy::Look, &small(1, WorkloadPattern::Uniform)).unwrap();
    let b = run(SeekPolicy::Look, &small(2, WorkloadPattern::Uniform)).unwrap();
    assert_ne!(a.total_seek, b.total_seek);
}

#[test_case(WorkloadPattern::Uniform; "uniform")]
#[test_case(WorkloadPattern::Sequential; "sequential")]
#[test_case(WorkloadPattern::Hotspot; "hotspot")]
fn every_variant_conserves_requests(pattern: WorkloadPattern) {
    let config = small(77, pattern);
    let reports = compare(&config, 64).expect("all variants run cleanly");

    assert_eq!(reports.len(), scheduler_variants(64).len());
    for report in &reports {
        assert_eq!(report.requests, 2_000, "{}", report.label());
        assert_eq!(
            report.dispatched + report.merges,
            report.requests,
            "{}: every extent is dispatched directly or through a merge",
            report.label()
        );
    }
}

#[test_case(WorkloadPattern::Uniform; "uniform")]
#[test_case(WorkloadPattern::Sequential; "sequential")]
#[test_case(WorkloadPattern::Hotspot; "hotspot")]
fn device_spanning_all_of_u64_runs_cleanly(pattern: WorkloadPattern) {
    let config = SimulationConfig {
        requests: 100,
        max_sector: u64::MAX,
        max_length: u64::MAX / 2,
        ..small(31, pattern)
    };
    let reports = compare(&config, 16).expect("huge sector ranges must not overflow");

    for report in &reports {
        assert_eq!(report.dispatched + report.merges, 100, "{}", report.label());
    }
}

#[test]
fn merges_happen_when_requested() {
    let config = SimulationConfig {
        merge_probability: 0.9,
        ..small(5, WorkloadPattern::Uniform)
    };
    let report = run(SeekPolicy::Sstf, &config).unwrap();
    assert!(report.merges > 500, "only {} merges", report.merges);
}

#[test]
fn no_merges_without_adjacency() {
    let config = SimulationConfig {
        merge_probability: 0.0,
        max_sector: 1 << 40,
        max_length: 1,
        ..small(5, WorkloadPattern::Uniform)
    };
    let report = run(SeekPolicy::Look, &config).unwrap();
    assert_eq!(report.merges, 0);
    assert_eq!(report.dispatched, report.requests);
}

#[test]
fn look_beats_fifo_on_a_deep_uniform_queue() {
    let config = SimulationConfig {
        dispatch_every: 64,
        merge_probability: 0.0,
        ..small(99, WorkloadPattern::Uniform)
    };
    for policy in SeekPolicy::ALL {
        let report = run(policy, &config).unwrap();
        assert!(
            report.seek_ratio() < 0.5,
            "{} seek ratio {:.2}",
            report.label(),
            report.seek_ratio()
        );
    }
}

#[test]
fn sweep_end_shapes_the_counters() {
    let config = small(31, WorkloadPattern::Uniform);
    let reports = compare(&config, 16).unwrap();

    let find = |policy: SeekPolicy, sweep_end: SweepEnd| {
        reports
            .iter()
            .find(|r| r.policy == policy && (policy == SeekPolicy::Sstf || r.sweep_end == sweep_end))
            .expect("variant present")
    };

    let wrap = find(SeekPolicy::Look, SweepEnd::Wrap);
    assert!(wrap.wraps > 0);
    assert_eq!(wrap.reversals, 0);
    assert_eq!(wrap.stalls, 0);

    let reverse = find(SeekPolicy::Look, SweepEnd::Reverse);
    assert!(reverse.reversals > 0);
    assert_eq!(reverse.wraps, 0);

    let stall = find(SeekPolicy::Look, SweepEnd::Stall);
    assert!(stall.stalls > 0);

    let sstf = find(SeekPolicy::Sstf, SweepEnd::Wrap);
    assert_eq!(sstf.wraps + sstf.reversals + sstf.stalls, 0);
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let config = SimulationConfig {
        max_length: 0,
        ..SimulationConfig::default()
    };
    let err = Simulation::new(SchedulerConfig::look(), config).unwrap_err();
    assert!(matches!(err, SimError::Config(_)));
}

#[test]
fn impossible_capacity_surfaces_as_scheduler_error() {
    let scheduler = SchedulerConfig::look().with_initial_capacity(usize::MAX);
    let err = Simulation::new(scheduler, small(1, WorkloadPattern::Uniform))
        .unwrap()
        .run()
        .unwrap_err();
    assert!(matches!(err, SimError::Scheduler(_)));
}

#[test]
fn report_serializes_to_json() {
    let report = run(SeekPolicy::Look, &small(3, WorkloadPattern::Sequential)).unwrap();
    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["policy"], "look");
    assert_eq!(value["sweep_end"], "wrap");
    assert_eq!(value["pattern"], "sequential");
    assert_eq!(value["requests"], 2_000);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn arbitrary_small_runs_conserve_requests(
        seed in any::<u64>(),
        requests in 1u64..300,
        max_sector in 1u64..5_000,
        max_length in 1u64..32,
        merge_probability in 0.0f64..=1.0,
        dispatch_every in 1u64..24,
        pattern in prop::sample::select(WorkloadPattern::ALL.to_vec()),
        variant in 0usize..4,
    ) {
        let config = SimulationConfig {
            seed,
            requests,
            max_sector,
            max_length: max_length.min(max_sector),
            pattern,
            merge_probability,
            dispatch_every,
        };
        let scheduler = scheduler_variants(8)[variant];

        let report = Simulation::new(scheduler, config)
            .unwrap()
            .run()
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(report.dispatched + report.merges, requests);
    }
}
