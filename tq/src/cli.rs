//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// TaskQueue - bounded-concurrency task scheduler
#[derive(Parser)]
#[command(
    name = "tq",
    about = "Run placeholder tasks through a bounded-concurrency FIFO scheduler",
    version,
    after_help = "Logs are written to: ~/.local/share/taskqueue/logs/taskqueue.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit placeholder tasks and wait for all of them
    Run(RunArgs),

    /// Print the resolved configuration as YAML
    Config,
}

/// Overrides for `tq run`; unset flags fall back to the config file
#[derive(Debug, Default, clap::Args)]
pub struct RunArgs {
    /// Number of tasks to submit
    #[arg(short = 'n', long)]
    pub tasks: Option<usize>,

    /// Maximum tasks running at once
    #[arg(short = 'j', long)]
    pub limit: Option<usize>,

    /// Shortest simulated task duration in seconds
    #[arg(long)]
    pub min_secs: Option<u64>,

    /// Longest simulated task duration in seconds
    #[arg(long)]
    pub max_secs: Option<u64>,
}

impl RunArgs {
    /// Apply the flags that were given on top of `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(tasks) = self.tasks {
            config.demo.tasks = tasks;
        }
        if let Some(limit) = self.limit {
            config.scheduler.concurrency_limit = limit;
        }
        if let Some(min_secs) = self.min_secs {
            config.demo.min_secs = min_secs;
        }
        if let Some(max_secs) = self.max_secs {
            config.demo.max_secs = max_secs;
        }
    }
}
