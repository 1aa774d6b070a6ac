//! Text rendering for the CPU and timer reports.

use crate::cpuinfo::CpuInfo;
use crate::timer::TimerReport;
use console::style;
use std::io::{self, Write};

const RULE_WIDTH: usize = 50;
const FLAG_COLUMNS: usize = 4;
const FLAG_WIDTH: usize = 15;

/// Write the CPU report. `verbose` lists every flag instead of a count.
pub fn write_cpu_plain<W: Write>(out: &mut W, info: &CpuInfo, verbose: bool) -> io::Result<()> {
    writeln!(out, "{}", style("CPU Information").bold())?;
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(out)?;

    writeln!(out, "Logical CPUs:  {}", info.count.logical)?;
    writeln!(out, "Physical CPUs: {}", info.count.physical)?;
    if let Some(model) = &info.model {
        writeln!(out, "Model:         {}", model)?;
    }
    if let Some(vendor) = &info.vendor {
        writeln!(out, "Vendor:        {}", vendor)?;
    }
    if let Some(mhz) = info.mhz {
        writeln!(out, "Frequency:     {:.2} MHz", mhz)?;
    }
    if let Some(cache) = &info.cache_size {
        writeln!(out, "Cache Size:    {}", cache)?;
    }
    for (level, size) in &info.caches {
        writeln!(out, "{:<15}{}", format!("{} Cache:", level), size)?;
    }
    writeln!(
        out,
        "Virtual CPU:   {}",
        if info.is_virtual { "Yes" } else { "No" }
    )?;
    if let Some(usage) = info.usage {
        writeln!(out, "CPU Usage:     {:.1}%", usage)?;
    }
    if let Some(temp) = info.temperature {
        writeln!(out, "Temperature:   {:.1}°C", temp)?;
    }
    writeln!(out, "Platform:      {}", info.platform)?;
    writeln!(out, "Architecture:  {}", info.architecture)?;

    if verbose && !info.flags.is_empty() {
        writeln!(out)?;
        writeln!(out, "CPU Flags ({}):", info.flags.len())?;
        writeln!(out, "{}", "-".repeat(RULE_WIDTH))?;
        for row in info.flags.chunks(FLAG_COLUMNS) {
            let cells: Vec<String> = row
                .iter()
                .map(|flag| format!("{:<width$}", flag, width = FLAG_WIDTH))
                .collect();
            writeln!(out, "  {}", cells.join("  ").trim_end())?;
        }
    } else if let Some(count) = info.flag_count {
        writeln!(out, "CPU Flags:     {} features", count)?;
    }
    Ok(())
}

/// Write the timer report.
pub fn write_timer_plain<W: Write>(out: &mut W, report: &TimerReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{} {}", style("Command:").bold(), report.command)?;
    if report.runs.len() > 1 {
        for sample in &report.runs {
            let status = if sample.success {
                style("ok".to_string()).green()
            } else {
                style(match sample.exit_code {
                    Some(code) => format!("exit {}", code),
                    None => "killed".to_string(),
                })
                .red()
            };
            writeln!(out, "  run {:>3}: {:.6}s  {}", sample.run, sample.seconds, status)?;
        }
    }

    let stats = &report.stats;
    if report.runs.len() == 1 {
        writeln!(out, "time to execute = {:.6}s", stats.mean)?;
    } else {
        writeln!(
            out,
            "{} mean {:.6}s ± {:.6}s, median {:.6}s, min {:.6}s, max {:.6}s ({} runs)",
            style("Time:").bold(),
            stats.mean,
            stats.stddev,
            stats.median,
            stats.min,
            stats.max,
            report.runs.len()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpuinfo::CpuCount;
    use crate::timer::{RunSample, TimingStats};
    use std::collections::BTreeMap;

    fn cpu() -> CpuInfo {
        CpuInfo {
            count: CpuCount {
                logical: 8,
                physical: 4,
            },
            platform: "linux".into(),
            architecture: "x86_64".into(),
            model: Some("Test CPU".into()),
            vendor: None,
            mhz: Some(2400.0),
            cache_size: None,
            caches: BTreeMap::new(),
            flags: (0..6).map(|i| format!("f{}", i)).collect(),
            flag_count: Some(6),
            usage: Some(12.345),
            temperature: None,
            is_virtual: true,
        }
    }

    fn render_cpu(info: &CpuInfo, verbose: bool) -> String {
        let mut buf = Vec::new();
        write_cpu_plain(&mut buf, info, verbose).unwrap();
        console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned()
    }

    #[test]
    fn test_cpu_text() {
        let text = render_cpu(&cpu(), false);
        assert!(text.starts_with("CPU Information\n"));
        assert!(text.contains("Logical CPUs:  8\n"));
        assert!(text.contains("Physical CPUs: 4\n"));
        assert!(text.contains("Frequency:     2400.00 MHz\n"));
        assert!(text.contains("CPU Usage:     12.3%\n"));
        assert!(text.contains("Virtual CPU:   Yes\n"));
        assert!(text.contains("CPU Flags:     6 features\n"));
        assert!(!text.contains("Vendor:"));
        assert!(!text.contains("Temperature:"));
    }

    #[test]
    fn test_cpu_flags_in_columns() {
        let text = render_cpu(&cpu(), true);
        assert!(text.contains("CPU Flags (6):\n"));
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("  f")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with(&format!("  {:<15}  f1", "f0")));
        assert_eq!(rows[1], format!("  {:<15}  f5", "f4"));
    }

    #[test]
    fn test_timer_text() {
        let report = TimerReport {
            command: "sleep 1".into(),
            warmup: 0,
            runs: vec![
                RunSample {
                    run: 1,
                    seconds: 1.0,
                    success: true,
                    exit_code: Some(0),
                },
                RunSample {
                    run: 2,
                    seconds: 3.0,
                    success: false,
                    exit_code: Some(2),
                },
            ],
            stats: TimingStats {
                min: 1.0,
                max: 3.0,
                mean: 2.0,
                median: 2.0,
                stddev: 1.0,
            },
        };
        let mut buf = Vec::new();
        write_timer_plain(&mut buf, &report).unwrap();
        let text = console::strip_ansi_codes(&String::from_utf8(buf).unwrap()).into_owned();

        assert!(text.contains("Command: sleep 1"));
        assert!(text.contains("run   2: 3.000000s  exit 2"));
        assert!(text.contains("mean 2.000000s ± 1.000000s"));
        assert!(text.contains("(2 runs)"));
    }
}
