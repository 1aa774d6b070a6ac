//! Output formatting module.
//!
//! Renders scan reports as plain text, JSON or CSV, and CPU and timing
//! reports as plain text or JSON. Every renderer writes to a caller-supplied
//! writer; the `print_*` helpers target stdout.

mod csv_format;
mod json_format;
mod plain;
mod system;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{
    print_error, print_info, print_scan_header, print_warning, write_plain,
};
pub use system::{write_cpu_plain, write_timer_plain};

use crate::cli::OutputFormat;
use crate::scanner::{ProbeResult, Protocol, Reachability, ScanReport};
use serde::Serialize;
use std::io::{self, Write};

/// Flat, serializable view of one probe result.
///
/// `open` mirrors reachability as `true`/`false`/`null` so consumers that
/// only care about a boolean keep working.
#[derive(Debug, Serialize)]
pub struct ResultRow<'a> {
    pub host: &'a str,
    pub port: u16,
    pub protocol: Protocol,
    pub reachability: Reachability,
    pub open: Option<bool>,
    pub error: Option<&'a str>,
    pub latency_ms: Option<f64>,
}

impl<'a> From<&'a ProbeResult> for ResultRow<'a> {
    fn from(result: &'a ProbeResult) -> Self {
        Self {
            host: result.host.as_str(),
            port: result.port.as_u16(),
            protocol: result.protocol,
            reachability: result.reachability,
            open: result.reachability.as_open_flag(),
            error: result.error.as_deref(),
            latency_ms: result.latency_ms,
        }
    }
}

/// Format and print a scan report according to the specified format.
pub fn print_report(report: &ScanReport, format: OutputFormat, verbose: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format, verbose)?;
    out.flush()
}

/// Format a scan report into `out`.
pub fn write_report<W: Write>(
    out: &mut W,
    report: &ScanReport,
    format: OutputFormat,
    verbose: bool,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => write_plain(out, report, verbose),
        OutputFormat::Json => write_json(out, report),
        OutputFormat::Csv => write_csv(out, report),
    }
}

/// Serialize any value as pretty JSON followed by a newline.
pub fn write_json_value<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value).map_err(io::Error::other)?;
    writeln!(out)
}
