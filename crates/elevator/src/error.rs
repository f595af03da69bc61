//! Scheduler error types.

use std::collections::TryReserveError;

use elevator_types::{RequestId, RequestRef, Sector};

/// Errors from the scheduling core.
///
/// Apart from [`ElevatorError::Allocation`], every variant reports a host whose
/// bookkeeping has drifted from the scheduler's. The panicking entry points on
/// [`Scheduler`](crate::Scheduler) treat them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum ElevatorError {
    /// Internal structures could not be reserved at construction.
    #[error("failed to reserve {requested} request slots: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    /// A request was inserted at a sector that already has a pending request.
    #[error("duplicate request at sector {sector}: {existing} already pending, {incoming} rejected")]
    DuplicateSector {
        sector: Sector,
        existing: RequestRef,
        incoming: RequestRef,
    },

    /// No request is pending at the handle's start sector.
    #[error("request {request} is not pending")]
    NotPending { request: RequestRef },

    /// A different request is pending at the handle's start sector.
    #[error("request {request} is not pending: sector {} holds {found}", .request.start())]
    IdentityMismatch {
        request: RequestRef,
        found: RequestId,
    },

    /// The scheduler was shut down while requests were still queued.
    #[error("scheduler shut down with {pending} pending request(s)")]
    PendingAtShutdown { pending: usize },
}
