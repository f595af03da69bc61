//! # elevator: Seek-ordering block request scheduler
//!
//! This crate decides the order in which pending block I/O requests are
//! serviced so the head of a positional device travels as little as possible.
//! It is the scheduling core only: the host owns the request records, performs
//! the transfers and serializes calls into the scheduler.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                  Scheduler                    │
//! │   last_serviced · direction · SchedulerConfig │
//! │                                               │
//! │  ┌──────────────────┐   ┌──────────────────┐  │
//! │  │  merge           │   │  RequestSet      │  │
//! │  │  merge_check     │──▶│  BTreeMap index  │  │
//! │  │  merged_notify   │   │  + node arena    │  │
//! │  └──────────────────┘   └──────────────────┘  │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! # Policies
//!
//! - [`SeekPolicy::Look`]: sweep upward from the head in sector order. What
//!   happens past the last pending sector is chosen by [`SweepEnd`].
//! - [`SeekPolicy::Sstf`]: always the nearest pending sector; ties go to the
//!   lower sector.
//!
//! # Example
//!
//! ```
//! use elevator::{MergeDecision, Scheduler};
//! use elevator_types::{RequestId, RequestRef, SchedulerConfig, Sector, SectorCount};
//!
//! let mut scheduler = Scheduler::new(SchedulerConfig::look()).unwrap();
//!
//! for (id, start) in [(1, 10), (2, 50), (3, 30)] {
//!     let request = RequestRef::new(RequestId::new(id), Sector::new(start), SectorCount::new(8));
//!     assert_eq!(scheduler.merge_check(request.end()), MergeDecision::NoMerge);
//!     scheduler.add(request);
//! }
//!
//! let order: Vec<u64> = std::iter::from_fn(|| scheduler.dispatch(false))
//!     .map(|rq| rq.start().as_u64())
//!     .collect();
//! assert_eq!(order, vec![10, 30, 50]);
//!
//! scheduler.shutdown();
//! ```

mod error;
pub mod merge;
mod request_set;
mod scheduler;

pub use elevator_types::{
    Direction, RequestId, RequestRef, SchedulerConfig, Sector, SectorCount, SeekPolicy, SweepEnd,
};
pub use error::ElevatorError;
pub use merge::MergeDecision;
pub use request_set::RequestSet;
pub use scheduler::Scheduler;
