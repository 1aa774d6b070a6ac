//! CSV output formatting.

use super::ResultRow;
use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Write the report as CSV with a header row.
pub fn write_csv<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    for result in report {
        wtr.serialize(ResultRow::from(result))?;
    }

    wtr.flush()?;
    Ok(())
}
