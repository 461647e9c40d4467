//! TaskQueue - bounded-concurrency FIFO task scheduler
//!
//! Callers submit task factories. Up to a fixed number of tasks run at once;
//! the rest wait in submission order and start automatically as running
//! tasks finish.
//!
//! # Modules
//!
//! - [`scheduler`] - Admission, FIFO wait list, and completion handles
//! - [`config`] - Configuration types and loading
//! - [`demo`] - Placeholder sleep workload driven by the `tq` binary
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use taskqueue::Scheduler;
//!
//! let scheduler = Scheduler::with_limit(3)?;
//! let handle = scheduler.submit(|| async { Ok::<_, eyre::Report>(42) }).await;
//! assert_eq!(handle.await?, 42);
//! ```

pub mod cli;
pub mod config;
pub mod demo;
pub mod scheduler;

// Re-export commonly used types
pub use config::{Config, DemoConfig};
pub use scheduler::{
    QueueEntry, QueueEntryStatus, QueueState, Scheduler, SchedulerConfig, SchedulerError, SchedulerStats, TaskError,
    TaskHandle, TaskOutcome, TaskResult,
};
