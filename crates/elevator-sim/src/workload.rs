//! Sector-address workload generation.
//!
//! ## Patterns
//!
//! - **Uniform**: start sectors spread evenly over the device
//! - **Sequential**: streaming runs, each request starting where the last one
//!   ended, with an occasional jump to a fresh position
//! - **Hotspot**: 80% of requests land in a band covering 5% of the device
//!
//! Front-merge opportunities are generated separately by [`WorkloadGenerator::abutting`],
//! which builds a request ending exactly where a chosen pending request starts.

use elevator::{Sector, SectorCount};
use elevator_config::{SimulationConfig, WorkloadPattern};

use crate::SimRng;

/// Chance that a sequential stream keeps going instead of jumping.
const SEQUENTIAL_CONTINUE: f64 = 0.9;
const HOTSPOT_TRAFFIC: f64 = 0.8;
/// Width of the hot band as a fraction of the device.
const HOTSPOT_WIDTH: f64 = 0.05;

/// A sector range `[start, start + length)` the host wants to transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    pub start: Sector,
    pub length: SectorCount,
}

impl Extent {
    pub fn end(&self) -> Sector {
        Sector::new(self.start.as_u64().saturating_add(self.length.as_u64()))
    }
}

/// Generates request extents for one simulation run.
#[derive(Debug)]
pub struct WorkloadGenerator {
    pattern: WorkloadPattern,
    max_sector: u64,
    max_length: u64,
    /// Where the current sequential run continues.
    stream_next: u64,
    /// First sector of the hot band.
    hotspot_base: u64,
    hotspot_width: u64,
}

impl WorkloadGenerator {
    /// Creates a generator. `config` must already have been validated.
    pub fn new(config: &SimulationConfig, rng: &mut SimRng) -> Self {
        let hotspot_width = ((config.max_sector as f64 * HOTSPOT_WIDTH) as u64)
            .clamp(config.max_length, config.max_sector);
        let hotspot_base = rng.next_u64_range(0, config.max_sector - hotspot_width);

        Self {
            pattern: config.pattern,
            max_sector: config.max_sector,
            max_length: config.max_length,
            stream_next: 0,
            hotspot_base,
            hotspot_width,
        }
    }

    pub fn pattern(&self) -> WorkloadPattern {
        self.pattern
    }

    /// Generates the next extent according to the pattern.
    pub fn next_extent(&mut self, rng: &mut SimRng) -> Extent {
        let length = rng.next_u64_range(1, self.max_length);

        let start = match self.pattern {
            WorkloadPattern::Uniform => self.uniform_start(rng, length),
            WorkloadPattern::Sequential => {
                let fits = self
                    .stream_next
                    .checked_add(length)
                    .is_some_and(|end| end <= self.max_sector);
                let start = if fits && rng.next_bool_with_probability(SEQUENTIAL_CONTINUE) {
                    self.stream_next
                } else {
                    self.uniform_start(rng, length)
                };
                self.stream_next = start.saturating_add(length);
                start
            }
            WorkloadPattern::Hotspot => {
                if rng.next_bool_with_probability(HOTSPOT_TRAFFIC) {
                    let slack = self.hotspot_width - length;
                    self.hotspot_base + rng.next_u64_range(0, slack)
                } else {
                    self.uniform_start(rng, length)
                }
            }
        };

        Extent {
            start: Sector::new(start),
            length: SectorCount::new(length),
        }
    }

    /// Generates an extent ending exactly at `target`, or `None` if the
    /// target is sector 0.
    pub fn abutting(&self, rng: &mut SimRng, target: Sector) -> Option<Extent> {
        let room = self.max_length.min(target.as_u64());
        if room == 0 {
            return None;
        }
        let length = rng.next_u64_range(1, room);
        Some(Extent {
            start: Sector::new(target.as_u64() - length),
            length: SectorCount::new(length),
        })
    }

    fn uniform_start(&self, rng: &mut SimRng, length: u64) -> u64 {
        rng.next_u64_range(0, self.max_sector - length)
    }
}
