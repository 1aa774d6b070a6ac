//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `hostcheck port <host> <ports>` - Check port reachability
//! - `hostcheck cpu` - Show CPU information
//! - `hostcheck time -- <cmd>` - Time a command

mod cpu;
mod port;
mod time;

pub use cpu::CpuCommand;
pub use port::PortCommand;
pub use time::TimeCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// hostcheck - basic host diagnostics.
///
/// Checks TCP/UDP port reachability, reports CPU details and times command
/// execution.
#[derive(Parser, Debug)]
#[command(name = "hostcheck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Basic host diagnostics: ports, CPU and command timing", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "hostcheck=trace"
    #[arg(long, global = true, value_name = "FILTER", env = "HOSTCHECK_LOG")]
    pub log_level: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether TCP/UDP ports are open on a host
    #[command(alias = "p")]
    Port(PortCommand),

    /// Display CPU information
    #[command(alias = "c")]
    Cpu(CpuCommand),

    /// Time the execution of a command
    #[command(alias = "t")]
    Time(TimeCommand),
}

impl Cli {
    /// Run the selected subcommand and return the process exit code.
    pub async fn execute(&self, cancel: CancellationToken) -> CliResult<u8> {
        let settings = AppSettings::resolve(self.config.as_deref())?;

        match &self.command {
            Commands::Port(cmd) => cmd.execute(&settings, self.quiet, cancel).await,
            Commands::Cpu(cmd) => cmd.execute(cancel).await,
            Commands::Time(cmd) => cmd.execute(self.quiet, cancel).await,
        }
    }
}

/// Output format for port reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_port_command() {
        let cli = Cli::try_parse_from([
            "hostcheck", "port", "example.com", "80-443", "-p", "udp", "-w", "50", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Port(cmd) => {
                assert_eq!(cmd.host, "example.com");
                assert_eq!(cmd.ports, "80-443");
                assert_eq!(cmd.workers, Some(50));
                assert!(cmd.json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_time_command() {
        let cli = Cli::try_parse_from(["hostcheck", "time", "-n", "3", "--", "ls", "-la"]).unwrap();
        match cli.command {
            Commands::Time(cmd) => {
                assert_eq!(cmd.runs, 3);
                assert_eq!(cmd.command, vec!["ls", "-la"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
