//! Command timing.
//!
//! Runs a command sequentially a fixed number of times and reports the
//! wall-clock duration of each run along with summary statistics.

use crate::error::{CliError, CliResult};
use serde::Serialize;
use std::time::{Duration, Instant};
use tokio::process::Command;

/// What to run and how many times.
#[derive(Debug, Clone)]
pub struct TimerSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Timed runs, at least 1.
    pub runs: usize,
    /// Untimed runs before measuring.
    pub warmup: usize,
}

impl TimerSpec {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            runs: 1,
            warmup: 0,
        }
    }

    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs.max(1);
        self
    }

    pub fn with_warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// The command line as typed.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One timed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSample {
    pub run: usize,
    pub seconds: f64,
    pub success: bool,
    pub exit_code: Option<i32>,
}

/// Summary statistics over run durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub stddev: f64,
}

impl TimingStats {
    /// Compute statistics; `None` for an empty sample.
    pub fn from_durations(durations: &[Duration]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }
        let mut secs: Vec<f64> = durations.iter().map(Duration::as_secs_f64).collect();
        secs.sort_by(f64::total_cmp);

        let n = secs.len() as f64;
        let mean = secs.iter().sum::<f64>() / n;
        let variance = secs.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        let mid = secs.len() / 2;
        let median = if secs.len() % 2 == 0 {
            (secs[mid - 1] + secs[mid]) / 2.0
        } else {
            secs[mid]
        };

        Some(Self {
            min: secs[0],
            max: secs[secs.len() - 1],
            mean,
            median,
            stddev: variance.sqrt(),
        })
    }
}

/// Result of timing a command.
#[derive(Debug, Clone, Serialize)]
pub struct TimerReport {
    pub command: String,
    pub warmup: usize,
    pub runs: Vec<RunSample>,
    pub stats: TimingStats,
}

impl TimerReport {
    /// Whether every timed run exited successfully.
    pub fn all_succeeded(&self) -> bool {
        self.runs.iter().all(|r| r.success)
    }
}

/// Run the command `warmup + runs` times, one after another.
///
/// Child stdio is inherited. Fails only when the command cannot be started.
pub async fn time_command(spec: &TimerSpec) -> CliResult<TimerReport> {
    let command = spec.command_line();

    for i in 0..spec.warmup {
        tracing::debug!(run = i + 1, "warmup run");
        run_once(spec).await?;
    }

    let mut samples = Vec::with_capacity(spec.runs);
    let mut durations = Vec::with_capacity(spec.runs);
    for i in 0..spec.runs.max(1) {
        let start = Instant::now();
        let status = run_once(spec).await?;
        let elapsed = start.elapsed();
        tracing::debug!(run = i + 1, elapsed_ms = elapsed.as_millis() as u64, %status, "timed run");

        durations.push(elapsed);
        samples.push(RunSample {
            run: i + 1,
            seconds: elapsed.as_secs_f64(),
            success: status.success(),
            exit_code: status.code(),
        });
    }

    let stats = TimingStats::from_durations(&durations).ok_or_else(|| CliError::Spawn {
        command: command.clone(),
        reason: "no runs completed".to_string(),
    })?;

    Ok(TimerReport {
        command,
        warmup: spec.warmup,
        runs: samples,
        stats,
    })
}

async fn run_once(spec: &TimerSpec) -> CliResult<std::process::ExitStatus> {
    Command::new(&spec.program)
        .args(&spec.args)
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| CliError::Spawn {
            command: spec.command_line(),
            reason: e.to_string(),
        })
}
