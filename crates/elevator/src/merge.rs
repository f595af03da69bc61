//! Front-merge detection.
//!
//! A candidate request whose end sector equals the start sector of a pending
//! request can be coalesced into it instead of being queued separately:
//!
//! ```text
//!   candidate   [ 90 ........ 100 )
//!   pending                   [ 100 ........ 110 )
//!   merged      [ 90 ........................ 110 )
//! ```
//!
//! The scheduler only detects the opportunity. The host performs the merge on
//! its own records and then reports which pending request it absorbed.

use elevator_types::{RequestRef, Sector};

use crate::{ElevatorError, RequestSet};

/// Outcome of a merge check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// No pending request starts where the candidate ends.
    NoMerge,
    /// The candidate ends exactly where this pending request starts.
    FrontMerge(RequestRef),
}

impl MergeDecision {
    pub fn is_merge(&self) -> bool {
        matches!(self, MergeDecision::FrontMerge(_))
    }

    /// The pending request the candidate can be merged into, if any.
    pub fn request(&self) -> Option<RequestRef> {
        match self {
            MergeDecision::NoMerge => None,
            MergeDecision::FrontMerge(existing) => Some(*existing),
        }
    }
}

/// Checks whether a candidate ending at `candidate_end` abuts a pending request.
///
/// Pure query: the set is not modified.
pub fn merge_check(requests: &RequestSet, candidate_end: Sector) -> MergeDecision {
    match requests.find_by_end(candidate_end) {
        Some(existing) => MergeDecision::FrontMerge(existing),
        None => MergeDecision::NoMerge,
    }
}

/// Drops a request the host has absorbed into another one.
///
/// This is the only way a request leaves the set without being dispatched
/// or explicitly removed.
///
/// # Errors
///
/// Returns [`ElevatorError::NotPending`] or [`ElevatorError::IdentityMismatch`]
/// if `absorbed` is not the request pending at its start sector.
pub fn merged_notify(
    requests: &mut RequestSet,
    absorbed: RequestRef,
) -> Result<RequestRef, ElevatorError> {
    requests.delete(absorbed)
}
