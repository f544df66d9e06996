//! Raw CSV tables with banner and unit rows.

use std::io::Read;
use std::path::Path;

use chrono::NaiveDateTime;
use csv::ReaderBuilder;
use flux_common::parse_f64;
use flux_model::parse_timestamp;

use crate::error::{IngestError, Result};

/// Where the header sits and how many descriptive rows follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    /// Lines before the header (file banners).
    pub banner_rows: usize,
    /// Lines between the header and the data (units, processing).
    pub descriptor_rows: usize,
}

impl TableLayout {
    /// EddyPro full output: banner, header, units.
    pub const FULL_OUTPUT: Self = Self {
        banner_rows: 1,
        descriptor_rows: 1,
    };
    /// Campbell TOA5 biomet: banner, header, units, processing.
    pub const TOA5: Self = Self {
        banner_rows: 1,
        descriptor_rows: 2,
    };
    /// A plain CSV with the header on the first line.
    pub const PLAIN: Self = Self {
        banner_rows: 0,
        descriptor_rows: 0,
    };
}

/// A CSV file split into header, descriptor rows and data rows.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub source_name: String,
    pub headers: Vec<String>,
    pub descriptors: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim_matches('"').to_string()
}

impl RawTable {
    pub fn from_path(path: &Path, layout: TableLayout) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, &path.display().to_string(), layout)
    }

    pub fn from_reader<R: Read>(reader: R, source_name: &str, layout: TableLayout) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut lines: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|source| IngestError::CsvParse {
                source_name: source_name.to_string(),
                source,
            })?;
            lines.push(record.iter().map(normalize_cell).collect());
        }

        let mut lines = lines.into_iter().skip(layout.banner_rows);
        let headers = lines.next().ok_or_else(|| IngestError::Truncated {
            source_name: source_name.to_string(),
            part: "header",
        })?;
        let descriptors: Vec<Vec<String>> = lines.by_ref().take(layout.descriptor_rows).collect();
        let rows = lines
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();
        Ok(Self {
            source_name: source_name.to_string(),
            headers,
            descriptors,
            rows,
        })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
                source_name: self.source_name.clone(),
            })
    }

    /// Cell text, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", String::as_str)
    }

    /// Parses one column into numbers, treating sentinels as missing.
    pub fn numeric_column(&self, column: usize) -> Vec<Option<f64>> {
        (0..self.rows.len())
            .map(|row| parse_measurement(self.cell(row, column)))
            .collect()
    }

    /// Parses the timestamp of every row from one or more columns joined by
    /// a space.
    pub fn timestamps(&self, columns: &[usize], first_data_line: usize) -> Result<Vec<NaiveDateTime>> {
        let mut index = Vec::with_capacity(self.rows.len());
        for row in 0..self.rows.len() {
            let raw = columns
                .iter()
                .map(|column| self.cell(row, *column))
                .collect::<Vec<_>>()
                .join(" ");
            let timestamp = parse_timestamp(&raw).ok_or_else(|| IngestError::InvalidTimestamp {
                source_name: self.source_name.clone(),
                line: first_data_line + row,
                value: raw.clone(),
            })?;
            index.push(timestamp);
        }
        Ok(index)
    }

    /// Descriptor cell (e.g. unit) of a column, if present.
    pub fn descriptor(&self, descriptor_row: usize, column: usize) -> Option<&str> {
        self.descriptors
            .get(descriptor_row)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

/// Missing-value sentinels written by EddyPro, SmartFlux and dataloggers.
pub fn is_sentinel(value: f64) -> bool {
    value <= -9999.0 || value == 9999.99
}

/// Parses a measurement cell; non-numeric, non-finite and sentinel values are
/// missing.
pub fn parse_measurement(raw: &str) -> Option<f64> {
    parse_f64(raw).filter(|value| !is_sentinel(*value))
}
