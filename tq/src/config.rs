//! TaskQueue configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scheduler::SchedulerConfig;

/// Main TaskQueue configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    /// Scheduler limits
    pub scheduler: SchedulerConfig,

    /// Placeholder workload run by `tq run`
    pub demo: DemoConfig,
}

impl Config {
    /// Check values the scheduler and demo cannot work with
    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate().context("Invalid scheduler configuration")?;
        self.demo.validate()
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {:#}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read just the log level, before logging is set up
    ///
    /// Never fails: any problem reading the file means "no level configured".
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_paths(),
        };

        paths
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| Self::load_from_file(&p).ok())
            .and_then(|config| config.log_level)
    }

    /// Project-local `.taskqueue.yml`, then `~/.config/taskqueue/taskqueue.yml`
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".taskqueue.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("taskqueue").join("taskqueue.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Placeholder workload configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of tasks to submit
    pub tasks: usize,

    /// Shortest simulated task duration in seconds
    #[serde(rename = "min-secs")]
    pub min_secs: u64,

    /// Longest simulated task duration in seconds
    #[serde(rename = "max-secs")]
    pub max_secs: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            tasks: 9,
            min_secs: 1,
            max_secs: 4,
        }
    }
}

impl DemoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.tasks == 0 {
            return Err(eyre::eyre!("Demo task count must be at least 1"));
        }
        if self.min_secs > self.max_secs {
            return Err(eyre::eyre!(
                "Demo min-secs ({}) is greater than max-secs ({})",
                self.min_secs,
                self.max_secs
            ));
        }
        Ok(())
    }
}
