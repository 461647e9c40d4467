//! Queue types for the scheduler

use std::fmt;
use std::time::{Duration, Instant};

use futures::future::BoxFuture;

/// Type-erased job: invoking it runs the factory to completion
pub(crate) type Job = Box<dyn FnOnce() -> BoxFuture<'static, Completion> + Send>;

/// A finished task whose result has not been handed to its submitter yet
pub(crate) struct Completion {
    pub outcome: TaskOutcome,
    deliver: Box<dyn FnOnce() + Send>,
}

impl Completion {
    pub fn new(outcome: TaskOutcome, deliver: impl FnOnce() + Send + 'static) -> Self {
        Self {
            outcome,
            deliver: Box::new(deliver),
        }
    }

    /// Resolve the submission's handle
    pub fn deliver(self) {
        (self.deliver)()
    }
}

/// How a task finished, as seen by the scheduler's bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Succeeded,
    Failed,
    Panicked,
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// A submitted task that has not started yet
pub(crate) struct PendingTask {
    pub id: u64,
    pub submitted_at: Instant,
    pub job: Job,
}

impl PendingTask {
    pub fn new(id: u64, job: Job) -> Self {
        Self {
            id,
            submitted_at: Instant::now(),
            job,
        }
    }
}

impl fmt::Debug for PendingTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTask")
            .field("id", &self.id)
            .field("submitted_at", &self.submitted_at)
            .finish_non_exhaustive()
    }
}

/// Statistics for the scheduler
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SchedulerStats {
    pub total_submitted: u64,
    pub total_queued: u64,
    pub total_started: u64,
    pub total_completed: u64,
    pub total_failed: u64,
    pub total_wait_time_ms: u64,
    pub peak_active: usize,
    pub peak_waiting: usize,
}

impl SchedulerStats {
    /// Mean time between submission and start, over started tasks
    pub fn average_wait(&self) -> Duration {
        if self.total_started == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(self.total_wait_time_ms / self.total_started)
    }
}

/// Consistent snapshot of the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueState {
    pub active: usize,
    pub waiting: usize,
    pub stats: SchedulerStats,
}

impl QueueState {
    /// Nothing running and nothing waiting
    pub fn is_idle(&self) -> bool {
        self.active == 0 && self.waiting == 0
    }
}

/// One task as listed by `Scheduler::queue_details`
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub id: u64,
    pub status: QueueEntryStatus,
    /// Time since start for running tasks, since submission for waiting ones
    pub elapsed: Duration,
}

/// Status of a queue entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEntryStatus {
    Running,
    Waiting,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_wait() {
        let stats = SchedulerStats {
            total_started: 4,
            total_wait_time_ms: 200,
            ..Default::default()
        };
        assert_eq!(stats.average_wait(), Duration::from_millis(50));
        assert_eq!(SchedulerStats::default().average_wait(), Duration::ZERO);
    }

    #[test]
    fn test_queue_state_idle() {
        let state = QueueState {
            active: 0,
            waiting: 0,
            stats: SchedulerStats::default(),
        };
        assert!(state.is_idle());

        let busy = QueueState { waiting: 1, ..state };
        assert!(!busy.is_idle());
    }

    #[test]
    fn test_completion_delivers_once() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicUsize, Ordering};

        let delivered = Arc::new(AtomicUsize::new(0));
        let counter = delivered.clone();
        let completion = Completion::new(TaskOutcome::Failed, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!completion.outcome.is_success());
        assert_eq!(delivered.load(Ordering::SeqCst), 0);
        completion.deliver();
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_pending_task_debug_omits_job() {
        let task = PendingTask::new(7, Box::new(|| Box::pin(async { Completion::new(TaskOutcome::Succeeded, || {}) })));
        let rendered = format!("{:?}", task);
        assert!(rendered.contains("id: 7"));
        assert!(!rendered.contains("job"));
    }
}
