//! Scheduler configuration

use serde::{Deserialize, Serialize};

use super::error::SchedulerError;

/// Default number of tasks allowed to run at once
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 3;

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Max tasks executing concurrently
    #[serde(rename = "concurrency-limit", default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
}

fn default_concurrency_limit() -> usize {
    DEFAULT_CONCURRENCY_LIMIT
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY_LIMIT,
        }
    }
}

impl SchedulerConfig {
    /// Create a config with the given concurrency limit
    pub fn with_limit(concurrency_limit: usize) -> Self {
        Self { concurrency_limit }
    }

    /// Reject limits that would never admit a task
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.concurrency_limit == 0 {
            return Err(SchedulerError::InvalidConcurrencyLimit(self.concurrency_limit));
        }
        Ok(())
    }
}
