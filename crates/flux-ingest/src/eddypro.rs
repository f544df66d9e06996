//! EddyPro full-output files.

use std::path::Path;

use flux_transform::{Cadence, Records, TimeFrame};
use tracing::info;

use crate::error::Result;
use crate::table::{RawTable, TableLayout};

/// Metadata columns that never become variables.
pub const FULL_OUTPUT_METADATA: [&str; 3] = ["filename", "date", "time"];

/// Column name and unit, in file order.
pub type Units = Vec<(String, String)>;

/// A full-output file on the half-hourly grid.
#[derive(Debug, Clone)]
pub struct FullOutput {
    pub frame: TimeFrame,
    pub units: Units,
}

/// Reads an EddyPro full-output file.
///
/// The first line is a banner, the second the header and the third the
/// units. The index is built from the `date` and `time` columns and the
/// result is resampled to 30 minutes.
pub fn read_full_output(path: &Path) -> Result<FullOutput> {
    let table = RawTable::from_path(path, TableLayout::FULL_OUTPUT)?;
    let output = full_output_from_table(&table)?;
    info!(
        path = %path.display(),
        records = output.frame.height(),
        variables = output.frame.width(),
        "read EddyPro full output"
    );
    Ok(output)
}

pub(crate) fn full_output_from_table(table: &RawTable) -> Result<FullOutput> {
    let date = table.require_column("date")?;
    let time = table.require_column("time")?;
    // banner, header and units precede the first data row
    let index = table.timestamps(&[date, time], 4)?;

    let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    let mut units = Vec::new();
    for (position, name) in table.headers.iter().enumerate() {
        if name.is_empty() || FULL_OUTPUT_METADATA.contains(&name.as_str()) {
            continue;
        }
        if columns.iter().any(|(existing, _)| existing == name) {
            continue;
        }
        units.push((
            name.clone(),
            table.descriptor(0, position).unwrap_or_default().to_string(),
        ));
        columns.push((name.clone(), table.numeric_column(position)));
    }
    let frame = Records::new(index, columns)?.resample(Cadence::HALF_HOURLY)?;
    Ok(FullOutput { frame, units })
}
