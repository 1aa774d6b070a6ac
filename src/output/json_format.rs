//! JSON output formatting.

use super::{write_json_value, ResultRow};
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write the report as a JSON array, one object per port.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let rows: Vec<ResultRow<'_>> = report.iter().map(ResultRow::from).collect();
    write_json_value(out, &rows)
}
