//! Scheduler and task errors

use thiserror::Error;

/// Errors from building a scheduler
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("Concurrency limit must be at least 1, got {0}")]
    InvalidConcurrencyLimit(usize),
}

/// Outcome of a task that did not produce a value
///
/// Only the holder of the submission's handle ever sees this.
#[derive(Debug, Error)]
pub enum TaskError<E> {
    #[error("Task failed: {0}")]
    Failed(E),

    #[error("Task panicked: {0}")]
    Panicked(String),

    #[error("Task result lost before delivery")]
    Lost,
}

impl<E> TaskError<E> {
    /// True if the task itself returned an error
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// True if the factory or task panicked
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }

    /// Extract the task's own error, if that is what this is
    pub fn into_failed(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}
