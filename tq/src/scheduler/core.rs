//! Scheduler implementation

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinError;
use tracing::{debug, warn};

use super::config::SchedulerConfig;
use super::error::{SchedulerError, TaskError};
use super::handle::{TaskHandle, TaskResult};
use super::queue::{Completion, Job, PendingTask, QueueEntry, QueueEntryStatus, QueueState, SchedulerStats, TaskOutcome};

/// Internal state protected by mutex
struct SchedulerInner {
    /// FIFO of submitted tasks not yet started
    waiting: VecDeque<PendingTask>,

    /// Number of admitted tasks that have not finished
    active: usize,

    /// Start time of each running task
    running: HashMap<u64, Instant>,

    /// Id for the next submission
    next_id: u64,

    /// Statistics
    stats: SchedulerStats,
}

impl SchedulerInner {
    fn new() -> Self {
        Self {
            waiting: VecDeque::new(),
            active: 0,
            running: HashMap::new(),
            next_id: 1,
            stats: SchedulerStats::default(),
        }
    }

    /// Take a slot for `task`
    fn start(&mut self, task: &PendingTask, limit: usize) {
        self.active += 1;
        assert!(
            self.active <= limit,
            "active count {} exceeds concurrency limit {}",
            self.active,
            limit
        );

        let now = Instant::now();
        self.running.insert(task.id, now);
        self.stats.total_started += 1;
        self.stats.total_wait_time_ms += now.duration_since(task.submitted_at).as_millis() as u64;
        self.stats.peak_active = self.stats.peak_active.max(self.active);
    }

    /// Give back the slot held by task `id`
    fn finish(&mut self, id: u64, outcome: TaskOutcome) {
        assert!(self.active > 0, "active count underflow finishing task {}", id);
        self.active -= 1;
        self.running.remove(&id);
        self.stats.total_completed += 1;
        if !outcome.is_success() {
            self.stats.total_failed += 1;
        }
    }

    /// Move the head of the wait list into a free slot
    ///
    /// No-op when every slot is taken or nothing is waiting.
    fn admit_next(&mut self, limit: usize) -> Option<PendingTask> {
        if self.active >= limit {
            return None;
        }
        let task = self.waiting.pop_front()?;
        self.start(&task, limit);
        Some(task)
    }
}

/// Bounded-concurrency FIFO scheduler
///
/// At most `concurrency_limit` tasks run at once. Tasks submitted while every
/// slot is taken wait in submission order and start as slots free up. Cloning
/// is cheap and every clone shares the same queue.
#[derive(Clone)]
pub struct Scheduler {
    config: SchedulerConfig,
    inner: Arc<Mutex<SchedulerInner>>,
}

impl Scheduler {
    /// Create a new scheduler with the given configuration
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        debug!(?config, "Scheduler::new: called");
        config.validate()?;
        Ok(Self {
            config,
            inner: Arc::new(Mutex::new(SchedulerInner::new())),
        })
    }

    /// Create a scheduler that runs at most `concurrency_limit` tasks at once
    pub fn with_limit(concurrency_limit: usize) -> Result<Self, SchedulerError> {
        Self::new(SchedulerConfig::with_limit(concurrency_limit))
    }

    pub fn concurrency_limit(&self) -> usize {
        self.config.concurrency_limit
    }

    /// Submit a task factory
    ///
    /// The factory is invoked once, when the task is admitted: right away if a
    /// slot is free, otherwise after every task queued before it has started.
    /// The returned handle resolves with this task's own result.
    pub async fn submit<F, Fut, T, E>(&self, factory: F) -> TaskHandle<T, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        let limit = self.config.concurrency_limit;
        let (tx, rx) = oneshot::channel();
        let mut inner = self.inner.lock().await;

        let id = inner.next_id;
        inner.next_id += 1;
        inner.stats.total_submitted += 1;
        debug!(task_id = id, active = inner.active, limit, "Scheduler::submit: called");

        let task = PendingTask::new(id, into_job(id, factory, tx));

        if inner.active < limit {
            debug!(task_id = id, "Scheduler::submit: under concurrency limit, starting immediately");
            inner.start(&task, limit);
            drop(inner);
            self.launch(task);
        } else {
            debug!(task_id = id, "Scheduler::submit: concurrency limit reached, queuing");
            inner.waiting.push_back(task);
            inner.stats.total_queued += 1;
            inner.stats.peak_waiting = inner.stats.peak_waiting.max(inner.waiting.len());
            debug!(task_id = id, position = inner.waiting.len(), "Queued");
        }

        TaskHandle::new(id, rx)
    }

    /// Run an admitted task on its own driver
    fn launch(&self, task: PendingTask) {
        debug!(task_id = task.id, "Scheduler::launch: called");
        tokio::spawn(self.clone().drive(task));
    }

    /// Run tasks in the slot this driver owns until no waiting task is handed over
    ///
    /// The slot is released before the finished task's handle resolves, so a
    /// submitter that awaited its handle never observes its own task as active.
    async fn drive(self, task: PendingTask) {
        let mut current = Some(task);
        while let Some(PendingTask { id, job, .. }) = current.take() {
            debug!(task_id = id, "Scheduler::drive: running task");
            let completion = job().await;
            current = self.complete_and_advance(id, completion.outcome).await;
            completion.deliver();
        }
        debug!("Scheduler::drive: no waiting tasks, releasing driver");
    }

    /// Release the finished task's slot and promote the next waiting task into it
    async fn complete_and_advance(&self, id: u64, outcome: TaskOutcome) -> Option<PendingTask> {
        debug!(task_id = id, ?outcome, "Scheduler::complete_and_advance: called");
        let mut inner = self.inner.lock().await;
        inner.finish(id, outcome);

        let next = inner.admit_next(self.config.concurrency_limit);
        match &next {
            Some(task) => {
                debug!(task_id = task.id, "Scheduler::complete_and_advance: promoting from queue");
            }
            None => {
                debug!(
                    active = inner.active,
                    waiting = inner.waiting.len(),
                    "Scheduler::complete_and_advance: nothing to promote"
                );
            }
        }
        next
    }

    /// Get a consistent snapshot of the queue
    pub async fn queue_state(&self) -> QueueState {
        debug!("Scheduler::queue_state: called");
        let inner = self.inner.lock().await;

        QueueState {
            active: inner.active,
            waiting: inner.waiting.len(),
            stats: inner.stats.clone(),
        }
    }

    /// List running tasks (by id) followed by waiting tasks in start order
    pub async fn queue_details(&self) -> Vec<QueueEntry> {
        debug!("Scheduler::queue_details: called");
        let inner = self.inner.lock().await;
        let now = Instant::now();

        let mut running: Vec<_> = inner
            .running
            .iter()
            .map(|(id, started)| QueueEntry {
                id: *id,
                status: QueueEntryStatus::Running,
                elapsed: now.duration_since(*started),
            })
            .collect();
        running.sort_by_key(|e| e.id);

        running
            .into_iter()
            .chain(inner.waiting.iter().map(|t| QueueEntry {
                id: t.id,
                status: QueueEntryStatus::Waiting,
                elapsed: now.duration_since(t.submitted_at),
            }))
            .collect()
    }

    /// Get the scheduler statistics
    pub async fn stats(&self) -> SchedulerStats {
        debug!("Scheduler::stats: called");
        let inner = self.inner.lock().await;
        inner.stats.clone()
    }
}

/// Erase a factory into a job whose completion reports back through `tx`
///
/// The factory is called inside its own tokio task, so a panic there or in the
/// future it returns surfaces as a `JoinError` instead of unwinding the driver.
fn into_job<F, Fut, T, E>(id: u64, factory: F, tx: oneshot::Sender<TaskResult<T, E>>) -> Job
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    Box::new(move || {
        async move {
            let joined = tokio::spawn(async move { factory().await }).await;

            let (outcome, result) = match joined {
                Ok(Ok(value)) => (TaskOutcome::Succeeded, Ok(value)),
                Ok(Err(e)) => {
                    warn!(task_id = id, "Task returned an error");
                    (TaskOutcome::Failed, Err(TaskError::Failed(e)))
                }
                Err(err) if err.is_panic() => {
                    let message = panic_message(err);
                    warn!(task_id = id, %message, "Task panicked");
                    (TaskOutcome::Panicked, Err(TaskError::Panicked(message)))
                }
                Err(err) => {
                    warn!(task_id = id, error = %err, "Task did not run to completion");
                    (TaskOutcome::Failed, Err(TaskError::Lost))
                }
            };

            Completion::new(outcome, move || {
                // Receiver gone means nobody is waiting on this result
                if tx.send(result).is_err() {
                    debug!(task_id = id, "into_job: handle dropped, discarding result");
                }
            })
        }
        .boxed()
    })
}

fn panic_message(err: JoinError) -> String {
    let payload = err.into_panic();
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
