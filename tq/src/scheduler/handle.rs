//! Completion handle returned by `Scheduler::submit`

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use super::error::TaskError;

/// Result delivered to a submission's handle
pub type TaskResult<T, E> = Result<T, TaskError<E>>;

/// Resolves when this submission's own task finishes
///
/// Dropping the handle does not cancel the task; the result is discarded.
#[derive(Debug)]
pub struct TaskHandle<T, E> {
    id: u64,
    rx: oneshot::Receiver<TaskResult<T, E>>,
}

impl<T, E> TaskHandle<T, E> {
    pub(crate) fn new(id: u64, rx: oneshot::Receiver<TaskResult<T, E>>) -> Self {
        Self { id, rx }
    }

    /// Id assigned at submission, in submission order
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl<T, E> Future for TaskHandle<T, E> {
    type Output = TaskResult<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(TaskError::Lost)),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_resolves_with_sent_value() {
        let (tx, rx) = oneshot::channel::<TaskResult<u32, String>>();
        let handle = TaskHandle::new(3, rx);
        assert_eq!(handle.id(), 3);

        tx.send(Ok(42)).unwrap();
        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_handle_reports_lost_when_sender_dropped() {
        let (tx, rx) = oneshot::channel::<TaskResult<u32, String>>();
        let handle = TaskHandle::new(1, rx);
        drop(tx);

        assert!(matches!(handle.await, Err(TaskError::Lost)));
    }
}
