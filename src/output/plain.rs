//! Plain text output formatting.
//!
//! One line per port with a status glyph, colored when the terminal allows.

use crate::scanner::{ProbeResult, Reachability, ScanJob, ScanReport};
use console::style;
use std::io::{self, Write};

/// Write the report as text.
///
/// Closed ports are listed only when `verbose` is set; ranges end with a
/// count summary.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport, verbose: bool) -> io::Result<()> {
    for result in report {
        write_line(out, result, verbose)?;
    }

    if report.len() > 1 {
        let summary = report.summary();
        writeln!(
            out,
            "\n{} open, {} closed, {} unknown ({} ports)",
            style(summary.open).green().bold(),
            style(summary.closed).red(),
            style(summary.indeterminate).yellow(),
            report.len()
        )?;
    }
    Ok(())
}

fn write_line<W: Write>(out: &mut W, result: &ProbeResult, verbose: bool) -> io::Result<()> {
    let target = format!("{}:{}", result.host, result.port);
    let cause = result
        .error
        .as_deref()
        .map(|e| format!(" - {}", e))
        .unwrap_or_default();

    match result.reachability {
        Reachability::Open => {
            let latency = result
                .latency_ms
                .map(|ms| format!(" ({}ms)", ms))
                .unwrap_or_default();
            writeln!(
                out,
                "{} {}{}",
                style(format!("{:10}", "✓ OPEN")).green().bold(),
                target,
                style(latency).dim()
            )
        }
        Reachability::Indeterminate => writeln!(
            out,
            "{} {}{}",
            style(format!("{:10}", "? UNKNOWN")).yellow(),
            target,
            cause
        ),
        Reachability::Closed if verbose => writeln!(
            out,
            "{} {}{}",
            style(format!("{:10}", "✗ CLOSED")).red(),
            target,
            cause
        ),
        Reachability::Closed => Ok(()),
    }
}

/// Print a header before a range scan begins.
pub fn print_scan_header(job: &ScanJob) {
    println!(
        "Scanning {} {} ports {}...",
        style(&job.host).bold(),
        job.protocol,
        job.ports
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), msg);
}
