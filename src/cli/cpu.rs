//! CPU subcommand implementation.

use crate::cpuinfo;
use crate::error::{CliError, CliResult};
use crate::output;
use clap::Parser;
use std::io::{self, Write};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Display CPU information.
///
/// Examples:
///   hostcheck cpu                  Display CPU information
///   hostcheck cpu --json           JSON output
///   hostcheck cpu --verbose        Show all CPU flags/features
#[derive(Parser, Debug)]
#[command(verbatim_doc_comment)]
pub struct CpuCommand {
    /// Output in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Show detailed CPU flags and features
    #[arg(short, long)]
    pub verbose: bool,

    /// Usage sampling interval in milliseconds (0 = average since boot)
    #[arg(long, value_name = "MS", default_value = "1000")]
    pub interval: u64,
}

impl CpuCommand {
    /// Execute the cpu command.
    pub async fn execute(&self, cancel: CancellationToken) -> CliResult<u8> {
        let info = tokio::select! {
            _ = cancel.cancelled() => return Err(CliError::Interrupted),
            info = cpuinfo::gather(Duration::from_millis(self.interval)) => info,
        };

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json {
            let info = if self.verbose { info } else { info.without_flags() };
            output::write_json_value(&mut out, &info)?;
        } else {
            output::write_cpu_plain(&mut out, &info, self.verbose)?;
        }
        out.flush()?;
        Ok(0)
    }
}
