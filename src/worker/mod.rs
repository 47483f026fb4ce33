//! Parallel vanity search.
//!
//! This module provides:
//! - `SearchWorker`: the batched generate-and-match loop run on each thread
//! - `WorkerPool`: spawning, stopping and joining worker threads
//! - `SearchCoordinator`: progress aggregation, first-match arbitration
//!   and cancellation
//!
//! Workers never share counters. They send `WorkerEvent`s over a channel
//! and the coordinator folds them into its own tally.

mod coordinator;
mod cpu;
mod event;
mod pool;

pub use coordinator::{
    search, CancelHandle, Progress, SearchCoordinator, SearchError, SearchOutcome, SearchResult,
};
pub use cpu::{SearchWorker, WorkerExit};
pub use event::{FoundEvent, WorkerEvent};
pub use pool::WorkerPool;
