//! TaskQueue - bounded-concurrency task scheduler
//!
//! CLI entry point that runs a placeholder workload through the scheduler.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use taskqueue::cli::{Cli, Command, RunArgs};
use taskqueue::config::Config;
use taskqueue::demo;
use taskqueue::scheduler::Scheduler;

fn parse_level(s: &str) -> tracing::Level {
    match s.to_uppercase().as_str() {
        "TRACE" => tracing::Level::TRACE,
        "DEBUG" => tracing::Level::DEBUG,
        "INFO" => tracing::Level::INFO,
        "WARN" | "WARNING" => tracing::Level::WARN,
        "ERROR" => tracing::Level::ERROR,
        _ => {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Note: Can't log params here since logging isn't initialized yet
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskqueue")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = cli_log_level
        .or(config_log_level)
        .map(parse_level)
        .unwrap_or(tracing::Level::INFO);

    let log_file = fs::File::create(log_dir.join("taskqueue.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());

    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Run(args)) => cmd_run(config, &args).await,
        Some(Command::Config) => cmd_config(&config),
        None => cmd_run(config, &RunArgs::default()).await,
    }
}

async fn cmd_run(mut config: Config, args: &RunArgs) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;
    debug!(?config, "cmd_run: resolved config");

    let scheduler = Scheduler::new(config.scheduler.clone()).context("Failed to create scheduler")?;
    println!(
        "Running {} tasks, at most {} at a time",
        config.demo.tasks.to_string().bold(),
        scheduler.concurrency_limit().to_string().bold()
    );

    let report = demo::run(&scheduler, &config.demo).await?;

    println!();
    println!("{} {} succeeded, {} failed", "Done:".green().bold(), report.succeeded, report.failed);
    println!("  Peak running: {}", report.stats.peak_active);
    println!("  Peak waiting: {}", report.stats.peak_waiting);
    println!("  Average wait: {:?}", report.stats.average_wait());
    info!(?report, "cmd_run: finished");

    if report.failed > 0 {
        return Err(eyre::eyre!("{} task(s) failed", report.failed));
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
