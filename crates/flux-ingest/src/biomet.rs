//! Campbell datalogger (TOA5) biomet files.

use std::path::PathBuf;

use flux_transform::{Cadence, Records, TimeFrame};
use tracing::{debug, info};

use crate::eddypro::Units;
use crate::error::{IngestError, Result};
use crate::table::{RawTable, TableLayout};

/// Index column of TOA5 files.
pub const TOA5_TIMESTAMP: &str = "TIMESTAMP";

#[derive(Debug, Clone)]
pub struct Biomet {
    pub frame: TimeFrame,
    pub units: Units,
}

/// Reads and concatenates biomet files.
///
/// Rows from all files are merged before resampling, so overlapping files
/// average into the same half-hour. Columns without a single value are
/// dropped together with their units.
pub fn read_biomet(paths: &[PathBuf]) -> Result<Biomet> {
    if paths.is_empty() {
        return Err(IngestError::NoFiles { kind: "biomet" });
    }
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        tables.push(RawTable::from_path(path, TableLayout::TOA5)?);
    }
    let biomet = biomet_from_tables(&tables)?;
    info!(
        files = paths.len(),
        records = biomet.frame.height(),
        variables = biomet.frame.width(),
        "read biomet data"
    );
    Ok(biomet)
}

pub(crate) fn biomet_from_tables(tables: &[RawTable]) -> Result<Biomet> {
    let mut records = Records::default();
    let mut units: Units = Vec::new();
    for table in tables {
        let timestamp = table.require_column(TOA5_TIMESTAMP)?;
        // banner, header, units and processing rows precede the data
        let index = table.timestamps(&[timestamp], 5)?;
        let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::new();
        for (position, name) in table.headers.iter().enumerate() {
            if position == timestamp || name.is_empty() {
                continue;
            }
            if columns.iter().any(|(existing, _)| existing == name) {
                continue;
            }
            if !units.iter().any(|(existing, _)| existing == name) {
                let unit = table.descriptor(0, position).unwrap_or_default();
                units.push((name.clone(), unit.to_string()));
            }
            columns.push((name.clone(), table.numeric_column(position)));
        }
        records.append(Records::new(index, columns)?);
    }

    let dropped = records.drop_empty_columns();
    if !dropped.is_empty() {
        debug!(columns = ?dropped, "dropping biomet columns without data");
        units.retain(|(name, _)| !dropped.contains(name));
    }
    let frame = TimeFrame::from_records(&records, Cadence::HALF_HOURLY)?;
    Ok(Biomet { frame, units })
}
