//! Port subcommand implementation.
//!
//! Handles `hostcheck port <host> <ports>`.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::{CliResult, ConfigError, InputError};
use crate::output;
use crate::scanner::{Protocol, Scan, ScanJob};
use crate::types::{Host, PortRange};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Check whether TCP/UDP ports are open on a host.
///
/// Examples:
///   hostcheck port example.com 80
///   hostcheck port 192.168.1.1 22 --timeout 5
///   hostcheck port example.com 80-443 --json
///   hostcheck port example.com 53 --protocol udp
///   hostcheck port 10.0.0.1 1-1024 --workers 50
#[derive(Parser, Debug)]
#[command(verbatim_doc_comment)]
pub struct PortCommand {
    /// Target hostname or IP address
    #[arg(value_name = "HOST")]
    pub host: String,

    /// Port number or inclusive range (e.g. 80 or 80-443)
    #[arg(value_name = "PORTS")]
    pub ports: String,

    /// Protocol to use [default: tcp]
    #[arg(short, long, value_enum)]
    pub protocol: Option<Protocol>,

    /// Connection timeout in seconds [default: 5]
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of concurrent workers for port ranges [default: 10]
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Maximum probes started per second (0 = unlimited)
    #[arg(short, long = "rate", value_name = "PPS")]
    pub rate_limit: Option<u32>,

    /// Output format for results [default: plain]
    #[arg(short, long, value_enum, conflicts_with = "json")]
    pub output: Option<OutputFormat>,

    /// Output results in JSON format (same as --output json)
    #[arg(short, long)]
    pub json: bool,

    /// Show closed ports (text output only)
    #[arg(short, long)]
    pub verbose: bool,
}

impl PortCommand {
    /// Build and validate the scan job. No network activity happens here.
    pub fn job(&self, settings: &AppSettings) -> Result<ScanJob, InputError> {
        let host = Host::parse(&self.host)?;
        let ports: PortRange = self.ports.parse()?;

        let job = ScanJob::new(
            host,
            self.protocol.unwrap_or(settings.default_protocol),
            ports,
        )
        .with_timeout(Duration::from_secs(
            self.timeout.unwrap_or(settings.default_timeout_secs),
        ))
        .with_workers(self.workers.unwrap_or(settings.default_workers))
        .with_rate_limit(self.rate_limit.unwrap_or(settings.default_rate_limit));

        job.validate()?;
        Ok(job)
    }

    /// Resolve the output format from flags, then settings.
    pub fn format(&self, settings: &AppSettings) -> Result<OutputFormat, ConfigError> {
        if self.json {
            return Ok(OutputFormat::Json);
        }
        if let Some(format) = self.output {
            return Ok(format);
        }
        OutputFormat::from_str(&settings.default_output_format, true).map_err(|_| {
            ConfigError::InvalidFormat(format!(
                "unknown output format '{}'",
                settings.default_output_format
            ))
        })
    }

    /// Execute the port command.
    pub async fn execute(
        &self,
        settings: &AppSettings,
        quiet: bool,
        cancel: CancellationToken,
    ) -> CliResult<u8> {
        let job = self.job(settings)?;
        let format = self.format(settings)?;
        let chatty = format == OutputFormat::Plain && !quiet && !job.ports.is_single();

        if chatty {
            output::print_scan_header(&job);
        }

        let mut scan = Scan::new(job.clone()).with_cancel(cancel);
        let progress = chatty.then(|| progress_bar(job.port_count()));
        if let Some(pb) = &progress {
            scan = scan.with_progress(pb.clone());
        }

        let outcome = scan.run().await;
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        let report = outcome?;

        output::print_report(&report, format, self.verbose)?;
        Ok(report.verdict().exit_code())
    }
}

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)";

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
