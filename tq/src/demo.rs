//! Placeholder workload for `tq run`
//!
//! Each task sleeps a random number of seconds and reports when it starts and
//! ends, which makes the concurrency ceiling visible on the terminal.

use std::time::Duration;

use colored::*;
use eyre::Result;
use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::DemoConfig;
use crate::scheduler::{Scheduler, SchedulerStats};

/// Summary of a finished demo run
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub succeeded: usize,
    pub failed: usize,
    pub stats: SchedulerStats,
}

/// Build the factory for task `n`
///
/// Nothing is printed or timed until the scheduler invokes the factory.
pub fn sleep_task(n: usize, min_secs: u64, max_secs: u64) -> impl FnOnce() -> BoxFuture<'static, Result<u64>> {
    move || {
        async move {
            let secs = rand::rng().random_range(min_secs..=max_secs);
            println!("{} task {}", "Start".green(), n);
            debug!(task = n, secs, "sleep_task: started");

            tokio::time::sleep(Duration::from_secs(secs)).await;

            println!("{} task {}: took {} seconds", "End".cyan(), n, secs);
            Ok::<_, eyre::Report>(secs)
        }
        .boxed()
    }
}

/// Submit `config.tasks` sleep tasks from concurrent submitters and wait for all of them
pub async fn run(scheduler: &Scheduler, config: &DemoConfig) -> Result<DemoReport> {
    debug!(?config, limit = scheduler.concurrency_limit(), "demo::run: called");
    config.validate()?;

    // One submitter per task, all racing for admission
    let submitters = (1..=config.tasks).map(|n| {
        let scheduler = scheduler.clone();
        let factory = sleep_task(n, config.min_secs, config.max_secs);
        tokio::spawn(async move { scheduler.submit(factory).await })
    });

    let mut handles = Vec::with_capacity(config.tasks);
    for submitted in join_all(submitters).await {
        handles.push(submitted?);
    }

    let state = scheduler.queue_state().await;
    info!(active = state.active, waiting = state.waiting, "All tasks submitted");

    let mut succeeded = 0;
    let mut failed = 0;
    let ids: Vec<u64> = handles.iter().map(|h| h.id()).collect();
    for (id, result) in ids.into_iter().zip(join_all(handles).await) {
        match result {
            Ok(secs) => {
                debug!(task_id = id, secs, "demo::run: task succeeded");
                succeeded += 1;
            }
            Err(e) => {
                warn!(task_id = id, error = %e, "demo::run: task failed");
                failed += 1;
            }
        }
    }

    Ok(DemoReport {
        succeeded,
        failed,
        stats: scheduler.stats().await,
    })
}
