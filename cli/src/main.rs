//! Arbor CLI - inspect reporting schedules and replay universe scenarios.
//!
//! ```text
//! arbor schedule [--at <ts>]            window id and bounds for a timestamp
//! arbor replay <scenario.toml> [...]    run steps against an in-memory ledger
//! ```
//!
//! Both commands print JSON on stdout. Logs go to stderr and are filtered by
//! `RUST_LOG` (default `info`).

mod scenario;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use arbor_config::ArborConfig;
use arbor_types::{ReportingSchedule, Timestamp, UniverseConfig, WindowId};

use crate::scenario::{Runner, Scenario};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Universe ledger for forkable prediction markets", version)]
struct Cli {
    /// Config file to use instead of ~/.arbor/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the reporting window a timestamp falls into
    Schedule {
        /// Unix timestamp in seconds (default: now)
        #[arg(long)]
        at: Option<u64>,
    },
    /// Replay a scenario file and print a JSON report
    Replay {
        /// Scenario TOML file
        scenario: PathBuf,
        /// Fail on the first rejected step
        #[arg(long)]
        strict: bool,
        /// Pin the starting clock (overrides the scenario's start_time)
        #[arg(long)]
        now: Option<u64>,
    },
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout carries the JSON output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Commands::Schedule { at } => {
            let at = at.map_or_else(wall_clock, |secs| Ok(Timestamp::from_secs(secs)))?;
            print_json(&ScheduleReport::new(&config.schedule, at)?)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Replay {
            scenario,
            strict,
            now,
        } => replay(&scenario, config, strict, now),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<UniverseConfig> {
    let loaded = match explicit {
        Some(path) => Some(ArborConfig::load_from(path)?),
        None => ArborConfig::load()?,
    };
    match loaded {
        Some(config) => {
            if let Some(path) = config.source() {
                tracing::info!(path = %path.display(), "Using config");
            }
            Ok(config.universe_config()?)
        }
        None => Ok(UniverseConfig::default()),
    }
}

fn wall_clock() -> Result<Timestamp> {
    let secs = Utc::now().timestamp();
    u64::try_from(secs)
        .map(Timestamp::from_secs)
        .map_err(|_| anyhow!("system clock is before the Unix epoch"))
}

fn replay(path: &Path, config: UniverseConfig, strict: bool, now: Option<u64>) -> Result<ExitCode> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read scenario {}", path.display()))?;
    let scenario = Scenario::parse(&content)
        .with_context(|| format!("failed to parse scenario {}", path.display()))?;

    let start = match now.or(scenario.start_time) {
        Some(secs) => Timestamp::from_secs(secs),
        None => wall_clock()?,
    };
    tracing::info!(
        scenario = %path.display(),
        steps = scenario.steps.len(),
        start_time = %start,
        "Replaying scenario"
    );

    let report = Runner::new(config, start, strict)?.run(&scenario)?;
    tracing::info!(
        steps = report.steps.len(),
        rejected = report.rejected(),
        "Scenario finished"
    );
    print_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, Serialize)]
struct ScheduleReport {
    schedule: ReportingSchedule,
    reporting_period_secs: u64,
    at: Timestamp,
    window_id: WindowId,
    window_start: Timestamp,
    window_end: Timestamp,
    market_end_offset_secs: Option<u64>,
}

impl ScheduleReport {
    fn new(schedule: &ReportingSchedule, at: Timestamp) -> Result<Self> {
        let window_id = schedule.window_id_of(at);
        let window_start = schedule
            .window_start(window_id)
            .context("window start overflows")?;
        let window_end = window_start
            .checked_add(schedule.reporting_period_secs())
            .context("window end overflows")?;
        Ok(Self {
            schedule: *schedule,
            reporting_period_secs: schedule.reporting_period_secs(),
            at,
            window_id,
            window_start,
            window_end,
            market_end_offset_secs: schedule.market_end_offset_secs(),
        })
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).context("failed to encode report")?;
    writeln!(out)?;
    Ok(())
}
