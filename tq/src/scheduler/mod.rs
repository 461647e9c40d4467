//! Bounded-concurrency task scheduler
//!
//! Admits up to a fixed number of tasks at once, queues the rest in FIFO
//! order, and starts the next waiting task whenever a running one finishes.

mod config;
mod core;
mod error;
mod handle;
mod queue;

pub use config::{DEFAULT_CONCURRENCY_LIMIT, SchedulerConfig};
pub use core::Scheduler;
pub use error::{SchedulerError, TaskError};
pub use handle::{TaskHandle, TaskResult};
pub use queue::{QueueEntry, QueueEntryStatus, QueueState, SchedulerStats, TaskOutcome};
