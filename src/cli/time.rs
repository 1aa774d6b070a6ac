//! Time subcommand implementation.

use crate::error::{CliError, CliResult};
use crate::output;
use crate::timer::{self, TimerSpec};
use clap::Parser;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;

/// Time the execution of a command.
///
/// Examples:
///   hostcheck time -- sleep 1
///   hostcheck time -n 10 --warmup 2 -- cargo --version
///   hostcheck time --json -- ls -la
#[derive(Parser, Debug)]
#[command(verbatim_doc_comment)]
pub struct TimeCommand {
    /// Number of timed runs
    #[arg(
        short = 'n',
        long,
        default_value = "1",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub runs: u64,

    /// Untimed runs before measuring
    #[arg(long, default_value = "0")]
    pub warmup: u64,

    /// Output results in JSON format
    #[arg(short, long)]
    pub json: bool,

    /// Command and arguments to run
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "COMMAND"
    )]
    pub command: Vec<String>,
}

impl TimeCommand {
    fn spec(&self) -> CliResult<TimerSpec> {
        let (program, args) = self.command.split_first().ok_or_else(|| CliError::Spawn {
            command: String::new(),
            reason: "no command given".to_string(),
        })?;
        Ok(TimerSpec::new(program.clone(), args.to_vec())
            .with_runs(self.runs as usize)
            .with_warmup(self.warmup as usize))
    }

    /// Execute the time command.
    pub async fn execute(&self, quiet: bool, cancel: CancellationToken) -> CliResult<u8> {
        let spec = self.spec()?;
        if !quiet && !self.json && spec.runs > 1 {
            output::print_info(&format!(
                "Timing '{}' ({} runs, {} warmup)",
                spec.command_line(),
                spec.runs,
                spec.warmup
            ));
        }

        let report = tokio::select! {
            _ = cancel.cancelled() => return Err(CliError::Interrupted),
            report = timer::time_command(&spec) => report?,
        };

        let stdout = io::stdout();
        let mut out = stdout.lock();
        if self.json {
            output::write_json_value(&mut out, &report)?;
        } else {
            output::write_timer_plain(&mut out, &report)?;
        }
        out.flush()?;

        Ok(if report.all_succeeded() { 0 } else { 1 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_args() {
        let cmd = TimeCommand {
            runs: 5,
            warmup: 1,
            json: false,
            command: vec!["echo".into(), "-n".into(), "hi".into()],
        };
        let spec = cmd.spec().unwrap();
        assert_eq!(spec.program, "echo");
        assert_eq!(spec.args, vec!["-n", "hi"]);
        assert_eq!(spec.runs, 5);
        assert_eq!(spec.warmup, 1);
    }
}
