//! Ordered set of pending requests keyed by start sector.
//!
//! The [`RequestSet`] answers the two questions a seek-ordering scheduler asks
//! on every decision: "what is the next request at or past this sector" and
//! "what is the request closest to this sector". Both are logarithmic.
//!
//! # Layout
//!
//! ```text
//!   index: BTreeMap<Sector, SlotIndex>        nodes: Vec<Option<RequestRef>>
//!   ┌────────┬──────┐                         ┌──────┬──────────────────────┐
//!   │ 10     │  2   │ ──────────────────────▶ │  0   │ rq#3 [30, 38)        │
//!   │ 30     │  0   │ ──────────────────────▶ │  1   │ (free)               │
//!   │ 50     │  3   │ ───────────┐            │  2   │ rq#1 [10, 18)        │
//!   └────────┴──────┘            └──────────▶ │  3   │ rq#2 [50, 51)        │
//!                                             └──────┴──────────────────────┘
//!   free: [1]
//! ```
//!
//! Requests live in an arena of nodes addressed by stable slot indices. The
//! ordered index maps each start sector to the slot holding its handle. Freed
//! slots are recycled, so the arena never grows past the peak number of
//! simultaneously pending requests.
//!
//! The set never owns a request record: it stores the host's [`RequestRef`]
//! handle and nothing else.

use std::collections::BTreeMap;

use elevator_types::{RequestRef, Sector, SeekPolicy};

use crate::ElevatorError;

/// Index of a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotIndex(usize);

impl SlotIndex {
    fn as_usize(self) -> usize {
        self.0
    }
}

/// Pending requests ordered by start sector.
///
/// # Invariants
///
/// - At most one request per start sector.
/// - Every slot referenced by `index` is occupied; every occupied slot is
///   referenced exactly once.
/// - `index.len() + free.len() == nodes.len()`.
#[derive(Debug, Default)]
pub struct RequestSet {
    nodes: Vec<Option<RequestRef>>,
    free: Vec<SlotIndex>,
    index: BTreeMap<Sector, SlotIndex>,
}

impl RequestSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty set with room for `capacity` requests.
    ///
    /// # Errors
    ///
    /// Returns [`ElevatorError::Allocation`] if the arena cannot be reserved.
    pub fn with_capacity(capacity: usize) -> Result<Self, ElevatorError> {
        let mut set = Self::new();
        set.nodes
            .try_reserve_exact(capacity)
            .and_then(|()| set.free.try_reserve_exact(capacity))
            .map_err(|source| ElevatorError::Allocation {
                requested: capacity,
                source,
            })?;
        Ok(set)
    }

    /// Number of pending requests.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of arena slots allocated, occupied or free.
    pub fn arena_slots(&self) -> usize {
        self.nodes.len()
    }

    /// Adds a request keyed by its start sector.
    ///
    /// # Errors
    ///
    /// Returns [`ElevatorError::DuplicateSector`] if a request is already
    /// pending at the same start sector. The set is unchanged.
    pub fn insert(&mut self, request: RequestRef) -> Result<(), ElevatorError> {
        let sector = request.start();
        if let Some(&slot) = self.index.get(&sector) {
            return Err(ElevatorError::DuplicateSector {
                sector,
                existing: self.node(slot),
                incoming: request,
            });
        }

        let slot = self.allocate(request);
        self.index.insert(sector, slot);

        debug_assert_eq!(self.index.len() + self.free.len(), self.nodes.len());
        Ok(())
    }

    /// Removes a request by identity.
    ///
    /// The handle must name the request currently pending at its start
    /// sector: a matching sector holding a different request id is rejected.
    ///
    /// # Errors
    ///
    /// - [`ElevatorError::NotPending`] if nothing is pending at the sector.
    /// - [`ElevatorError::IdentityMismatch`] if another request is pending there.
    pub fn delete(&mut self, request: RequestRef) -> Result<RequestRef, ElevatorError> {
        let sector = request.start();
        let slot = *self
            .index
            .get(&sector)
            .ok_or(ElevatorError::NotPending { request })?;

        let stored = self.node(slot);
        if stored.id() != request.id() {
            return Err(ElevatorError::IdentityMismatch {
                request,
                found: stored.id(),
            });
        }

        self.index.remove(&sector);
        self.release(slot);

        debug_assert_eq!(self.index.len() + self.free.len(), self.nodes.len());
        Ok(stored)
    }

    /// Withdraws a still-pending request the host no longer wants serviced.
    ///
    /// Same identity rules as [`delete`](Self::delete).
    pub fn remove(&mut self, request: RequestRef) -> Result<RequestRef, ElevatorError> {
        self.delete(request)
    }

    /// Returns the request pending at exactly `sector`.
    pub fn get(&self, sector: Sector) -> Option<RequestRef> {
        self.index.get(&sector).map(|&slot| self.node(slot))
    }

    /// Returns the request whose start sector equals `sector`.
    ///
    /// A candidate ending at `sector` can be front-merged into the result.
    pub fn find_by_end(&self, sector: Sector) -> Option<RequestRef> {
        self.get(sector)
    }

    /// Returns `true` if a request starts at `sector`.
    pub fn contains(&self, sector: Sector) -> bool {
        self.index.contains_key(&sector)
    }

    /// Pending request with the smallest start sector `>= target`.
    pub fn ceiling(&self, target: Sector) -> Option<RequestRef> {
        self.index
            .range(target..)
            .next()
            .map(|(_, &slot)| self.node(slot))
    }

    /// Pending request with the largest start sector `<= target`.
    pub fn floor(&self, target: Sector) -> Option<RequestRef> {
        self.index
            .range(..=target)
            .next_back()
            .map(|(_, &slot)| self.node(slot))
    }

    /// Pending request with the lowest start sector.
    pub fn first(&self) -> Option<RequestRef> {
        self.index.first_key_value().map(|(_, &slot)| self.node(slot))
    }

    /// Pending request with the highest start sector.
    pub fn last(&self) -> Option<RequestRef> {
        self.index.last_key_value().map(|(_, &slot)| self.node(slot))
    }

    /// Selects the request a head at `target` would service next.
    ///
    /// - [`SeekPolicy::Look`]: the first request at or past `target`; when
    ///   none remains, the lowest pending request.
    /// - [`SeekPolicy::Sstf`]: the request with the smallest seek distance
    ///   from `target`. Equidistant candidates resolve to the lower sector.
    ///
    /// Returns `None` only when the set is empty.
    pub fn find_nearest(&self, target: Sector, policy: SeekPolicy) -> Option<RequestRef> {
        match policy {
            SeekPolicy::Look => self.ceiling(target).or_else(|| self.first()),
            SeekPolicy::Sstf => match (self.floor(target), self.ceiling(target)) {
                (Some(below), Some(above)) => {
                    if target.distance(above.start()) < target.distance(below.start()) {
                        Some(above)
                    } else {
                        Some(below)
                    }
                }
                (below, above) => below.or(above),
            },
        }
    }

    /// Iterates pending requests in ascending start-sector order.
    pub fn iter(&self) -> impl Iterator<Item = RequestRef> + '_ {
        self.index.values().map(|&slot| self.node(slot))
    }

    /// Resolves a slot held by the index.
    ///
    /// # Panics
    ///
    /// Panics if the slot is free. `insert` links a slot into the index only
    /// after filling it and `delete` unlinks it before releasing it, so every
    /// slot the index holds is occupied.
    fn node(&self, slot: SlotIndex) -> RequestRef {
        match self.nodes[slot.as_usize()] {
            Some(request) => request,
            None => unreachable!("index references free slot {}", slot.as_usize()),
        }
    }

    fn allocate(&mut self, request: RequestRef) -> SlotIndex {
        if let Some(slot) = self.free.pop() {
            debug_assert!(self.nodes[slot.as_usize()].is_none(), "free slot occupied");
            self.nodes[slot.as_usize()] = Some(request);
            return slot;
        }

        let slot = SlotIndex(self.nodes.len());
        self.nodes.push(Some(request));
        slot
    }

    fn release(&mut self, slot: SlotIndex) {
        let previous = self.nodes[slot.as_usize()].take();
        debug_assert!(previous.is_some(), "released slot was already free");
        self.free.push(slot);
    }
}

#[cfg(test)]
mod tests {
    use elevator_types::{RequestId, SectorCount};

    use super::*;

    fn rq(id: u64, start: u64) -> RequestRef {
        RequestRef::new(RequestId::new(id), Sector::new(start), SectorCount::new(8))
    }

    fn set_of(starts: &[u64]) -> RequestSet {
        let mut set = RequestSet::new();
        for (i, &start) in starts.iter().enumerate() {
            set.insert(rq(i as u64 + 1, start)).unwrap();
        }
        set
    }

    #[test]
    fn insert_keeps_sector_order() {
        let set = set_of(&[50, 10, 30]);
        let order: Vec<u64> = set.iter().map(|r| r.start().as_u64()).collect();
        assert_eq!(order, vec![10, 30, 50]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn duplicate_sector_is_rejected_without_mutation() {
        let mut set = set_of(&[10]);
        let err = set.insert(rq(99, 10)).unwrap_err();

        assert!(matches!(
            err,
            ElevatorError::DuplicateSector { sector, .. } if sector == Sector::new(10)
        ));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(Sector::new(10)).unwrap().id(), RequestId::new(1));
    }

    #[test]
    fn delete_requires_matching_identity() {
        let mut set = set_of(&[10]);

        let err = set.delete(rq(42, 10)).unwrap_err();
        assert!(matches!(err, ElevatorError::IdentityMismatch { found, .. } if found == RequestId::new(1)));

        let err = set.delete(rq(1, 11)).unwrap_err();
        assert!(matches!(err, ElevatorError::NotPending { .. }));

        assert_eq!(set.delete(rq(1, 10)).unwrap().id(), RequestId::new(1));
        assert!(set.is_empty());
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut set = RequestSet::new();
        for round in 0..100u64 {
            set.insert(rq(round, round * 7)).unwrap();
            set.insert(rq(round + 1000, round * 7 + 3)).unwrap();
            set.delete(rq(round, round * 7)).unwrap();
            set.delete(rq(round + 1000, round * 7 + 3)).unwrap();
        }
        assert!(set.is_empty());
        assert_eq!(set.arena_slots(), 2);
    }

    #[test]
    fn index_only_references_occupied_slots_under_churn() {
        let mut set = RequestSet::new();
        for round in 0..4u64 {
            for start in 0..32 {
                set.insert(rq(round * 100 + start, start * 10)).unwrap();
            }
            for start in (0..32).step_by(3) {
                set.delete(rq(round * 100 + start, start * 10)).unwrap();
            }
            for start in (0..32).filter(|s| s % 3 != 0) {
                set.delete(rq(round * 100 + start, start * 10)).unwrap();
            }
            assert!(set.is_empty());
            assert_eq!(set.arena_slots(), 32);
        }

        for start in [5, 15, 25] {
            set.insert(rq(start, start)).unwrap();
        }
        set.delete(rq(15, 15)).unwrap();
        let starts: Vec<u64> = set.iter().map(|r| r.start().as_u64()).collect();
        assert_eq!(starts, vec![5, 25]);
        assert_eq!(set.get(Sector::new(25)).unwrap().id(), RequestId::new(25));
        assert!(set.get(Sector::new(15)).is_none());
    }

    #[test]
    fn ceiling_and_floor_include_exact_match() {
        let set = set_of(&[10, 30, 50]);

        assert_eq!(set.ceiling(Sector::new(30)).unwrap().start(), Sector::new(30));
        assert_eq!(set.floor(Sector::new(30)).unwrap().start(), Sector::new(30));
        assert_eq!(set.ceiling(Sector::new(31)).unwrap().start(), Sector::new(50));
        assert_eq!(set.floor(Sector::new(29)).unwrap().start(), Sector::new(10));
        assert!(set.ceiling(Sector::new(51)).is_none());
        assert!(set.floor(Sector::new(9)).is_none());
    }

    #[test]
    fn look_wraps_to_lowest_when_nothing_ahead() {
        let set = set_of(&[10, 30, 50]);
        let next = set.find_nearest(Sector::new(60), SeekPolicy::Look).unwrap();
        assert_eq!(next.start(), Sector::new(10));
    }

    #[test]
    fn sstf_tie_prefers_lower_sector() {
        let set = set_of(&[10, 50]);
        let next = set.find_nearest(Sector::new(30), SeekPolicy::Sstf).unwrap();
        assert_eq!(next.start(), Sector::new(10));
    }

    #[test]
    fn empty_set_has_no_nearest() {
        let set = RequestSet::new();
        assert!(set.find_nearest(Sector::ZERO, SeekPolicy::Look).is_none());
        assert!(set.find_nearest(Sector::ZERO, SeekPolicy::Sstf).is_none());
        assert!(set.first().is_none());
        assert!(set.last().is_none());
    }

    #[test]
    fn with_capacity_reserves_without_allocating_slots() {
        let set = RequestSet::with_capacity(64).unwrap();
        assert_eq!(set.arena_slots(), 0);
        assert!(set.nodes.capacity() >= 64);
    }

    #[test]
    fn absurd_capacity_reports_allocation_error() {
        let err = RequestSet::with_capacity(usize::MAX).unwrap_err();
        assert!(matches!(err, ElevatorError::Allocation { requested, .. } if requested == usize::MAX));
    }
}
