//! CSV export for envelope data points.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::envelope::DataPoint;

/// Column header for CSV export.
const HEADER: &str = "position,timestamp,value,unit,business_type,psr_type";

/// Exports data points to a CSV file at the given path.
///
/// Writes a header row followed by one row per point. Produces
/// deterministic output for identical inputs.
///
/// # Arguments
///
/// * `points` - Data points in envelope order
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(points: &[DataPoint], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(points, buf)
}

/// Writes data points as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(points: &[DataPoint], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;

    for p in points {
        let meta = |key: &str| p.metadata.get(key).cloned().unwrap_or_default();
        wtr.write_record([
            p.position.to_string(),
            p.timestamp.to_rfc3339(),
            p.value.to_string(),
            p.unit.clone(),
            meta("business_type"),
            meta("psr_type"),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
