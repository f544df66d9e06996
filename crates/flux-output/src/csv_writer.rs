//! CSV output of time frames.

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use flux_common::format_numeric;
use flux_model::format_timestamp;
use flux_transform::TimeFrame;
use tracing::info;

use crate::error::{OutputError, Result};

/// Name of the index column in written files.
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";

/// Writes a frame with a leading `TIMESTAMP` column.
///
/// Missing values are written as empty cells.
pub fn write_frame_csv(frame: &TimeFrame, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_frame_csv_to(frame, file)?;
    info!(
        path = %path.display(),
        records = frame.height(),
        columns = frame.width(),
        "wrote CSV"
    );
    Ok(())
}

pub fn write_frame_csv_to<W: Write>(frame: &TimeFrame, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    let names = frame.column_names();
    let columns: Vec<Vec<Option<f64>>> = names
        .iter()
        .map(|name| frame.values(name).unwrap_or_default())
        .collect();

    let mut header = Vec::with_capacity(names.len() + 1);
    header.push(TIMESTAMP_COLUMN.to_string());
    header.extend(names.iter().cloned());
    writer.write_record(&header)?;

    for (row, timestamp) in frame.index().iter().enumerate() {
        let mut record = Vec::with_capacity(columns.len() + 1);
        record.push(format_timestamp(*timestamp));
        for column in &columns {
            record.push(
                column
                    .get(row)
                    .copied()
                    .flatten()
                    .map(format_numeric)
                    .unwrap_or_default(),
            );
        }
        writer.write_record(&record)?;
    }
    writer.flush().map_err(|source| OutputError::Csv(source.into()))?;
    Ok(())
}

/// Renders a frame to a CSV string.
pub fn frame_to_csv_string(frame: &TimeFrame) -> Result<String> {
    let mut buffer = Vec::new();
    write_frame_csv_to(frame, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
