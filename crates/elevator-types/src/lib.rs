//! # elevator-types: Core types for `elevator`
//!
//! This crate contains the plain data shared by the scheduler core, the
//! configuration loader and the simulator:
//! - Positions ([`Sector`], [`SectorCount`])
//! - Request handles ([`RequestId`], [`RequestRef`])
//! - Scheduling policy ([`SeekPolicy`], [`SweepEnd`], [`Direction`])
//! - Scheduler construction parameters ([`SchedulerConfig`])

use std::{
    fmt::{Debug, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Positions - All Copy (cheap 8-byte values)
// ============================================================================

/// Smallest addressable unit of storage position.
///
/// Sectors are unsigned offsets from the start of the device. Ordering of
/// sectors is the ordering the scheduler sweeps in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Sector(u64);

impl Sector {
    pub const ZERO: Sector = Sector(0);
    pub const MAX: Sector = Sector(u64::MAX);

    pub fn new(sector: u64) -> Self {
        Self(sector)
    }

    /// Returns the sector as a `u64`.
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Absolute seek distance between two head positions.
    ///
    /// # Examples
    ///
    /// ```
    /// # use elevator_types::Sector;
    /// assert_eq!(Sector::new(40).distance(Sector::new(10)), 30);
    /// assert_eq!(Sector::new(10).distance(Sector::new(40)), 30);
    /// ```
    pub fn distance(self, other: Sector) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Returns the sector `count` sectors past this one, or `None` on overflow.
    pub fn checked_add(self, count: SectorCount) -> Option<Sector> {
        self.0.checked_add(count.0).map(Sector)
    }
}

impl Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Sector {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Sector> for u64 {
    fn from(sector: Sector) -> Self {
        sector.0
    }
}

/// A number of sectors (the length of a request).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct SectorCount(u64);

impl SectorCount {
    pub fn new(count: u64) -> Self {
        Self(count)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl Display for SectorCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SectorCount {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SectorCount> for u64 {
    fn from(count: SectorCount) -> Self {
        count.0
    }
}

// ============================================================================
// Request Handles
// ============================================================================

/// Host-assigned identifier of a request record.
///
/// The scheduler never interprets the value; it only compares it to detect a
/// host handing back a different record than the one that was queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rq#{}", self.0)
    }
}

impl From<u64> for RequestId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<RequestId> for u64 {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// Non-owning handle to a pending request.
///
/// The host owns the request record and its payload. The scheduler keeps only
/// this handle: the record's identity and the sector range used for ordering
/// and merge detection. The covered range is `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestRef {
    id: RequestId,
    start: Sector,
    length: SectorCount,
}

impl RequestRef {
    /// Creates a handle for the request `id` covering `length` sectors from `start`.
    ///
    /// # Panics
    ///
    /// Debug builds panic if the range would extend past `u64::MAX`.
    pub fn new(id: RequestId, start: Sector, length: SectorCount) -> Self {
        debug_assert!(
            start.checked_add(length).is_some(),
            "request {id} at sector {start} with length {length} overflows the sector space"
        );

        Self { id, start, length }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    /// First sector addressed by the request.
    pub fn start(&self) -> Sector {
        self.start
    }

    pub fn length(&self) -> SectorCount {
        self.length
    }

    /// One past the last sector addressed by the request.
    ///
    /// # Examples
    ///
    /// ```
    /// # use elevator_types::{RequestId, RequestRef, Sector, SectorCount};
    /// let rq = RequestRef::new(RequestId::new(1), Sector::new(100), SectorCount::new(10));
    /// assert_eq!(rq.end(), Sector::new(110));
    /// ```
    pub fn end(&self) -> Sector {
        Sector(self.start.0.saturating_add(self.length.0))
    }
}

impl Display for RequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}, {})", self.id, self.start, self.end())
    }
}

// ============================================================================
// Scheduling Policy
// ============================================================================

/// Error returned when parsing a policy name fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePolicyError {
    kind: &'static str,
    input: String,
}

impl Display for ParsePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {}: {:?}", self.kind, self.input)
    }
}

impl std::error::Error for ParsePolicyError {}

/// How the next request is chosen relative to the head position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeekPolicy {
    /// Sweep in sector order from the head; see [`SweepEnd`] for what happens
    /// once nothing remains ahead.
    #[default]
    Look,
    /// Shortest seek first: the nearest pending request in either direction.
    /// Equidistant candidates resolve to the lower sector.
    Sstf,
}

impl SeekPolicy {
    pub const ALL: [SeekPolicy; 2] = [SeekPolicy::Look, SeekPolicy::Sstf];

    pub fn as_str(self) -> &'static str {
        match self {
            SeekPolicy::Look => "look",
            SeekPolicy::Sstf => "sstf",
        }
    }
}

impl Display for SeekPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeekPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "look" => Ok(SeekPolicy::Look),
            "sstf" => Ok(SeekPolicy::Sstf),
            _ => Err(ParsePolicyError {
                kind: "seek policy",
                input: s.to_string(),
            }),
        }
    }
}

/// What a LOOK sweep does when no pending request lies ahead of the head.
///
/// Ignored by [`SeekPolicy::Sstf`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepEnd {
    /// Jump back to the lowest pending sector and sweep upward again.
    #[default]
    Wrap,
    /// Turn around and sweep toward lower sectors.
    Reverse,
    /// Report idle until a request arrives ahead of the head, unless the
    /// dispatch is forced, in which case wrap.
    Stall,
}

impl SweepEnd {
    pub const ALL: [SweepEnd; 3] = [SweepEnd::Wrap, SweepEnd::Reverse, SweepEnd::Stall];

    pub fn as_str(self) -> &'static str {
        match self {
            SweepEnd::Wrap => "wrap",
            SweepEnd::Reverse => "reverse",
            SweepEnd::Stall => "stall",
        }
    }
}

impl Display for SweepEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SweepEnd {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wrap" => Ok(SweepEnd::Wrap),
            "reverse" => Ok(SweepEnd::Reverse),
            "stall" => Ok(SweepEnd::Stall),
            _ => Err(ParsePolicyError {
                kind: "sweep end",
                input: s.to_string(),
            }),
        }
    }
}

/// Direction the head is currently sweeping in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Toward higher sectors.
    #[default]
    Ascending,
    /// Toward lower sectors.
    Descending,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Ascending => f.write_str("ascending"),
            Direction::Descending => f.write_str("descending"),
        }
    }
}

// ============================================================================
// Scheduler Configuration
// ============================================================================

/// Default number of arena slots reserved when a scheduler is created.
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Parameters fixed for the lifetime of one scheduler instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub policy: SeekPolicy,
    pub sweep_end: SweepEnd,
    /// Arena slots reserved up front. Reservation failure is reported as an
    /// initialization error rather than surfacing later as an abort.
    pub initial_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            policy: SeekPolicy::Look,
            sweep_end: SweepEnd::Wrap,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

impl SchedulerConfig {
    /// Creates a configuration for the given policy with default sweep handling.
    pub fn new(policy: SeekPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn look() -> Self {
        Self::new(SeekPolicy::Look)
    }

    pub fn sstf() -> Self {
        Self::new(SeekPolicy::Sstf)
    }

    pub fn with_sweep_end(mut self, sweep_end: SweepEnd) -> Self {
        self.sweep_end = sweep_end;
        self
    }

    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}
