//! Error types for flux data ingestion.

use std::path::PathBuf;

use flux_transform::TransformError;
use thiserror::Error;

/// Errors that can occur while reading flux, biomet or station data.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// Failed to open or read a file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No input files were given.
    #[error("no input files given for {kind} data")]
    NoFiles { kind: &'static str },

    // === CSV Parsing Errors ===
    /// Malformed CSV record.
    #[error("failed to parse CSV {source_name}: {source}")]
    CsvParse {
        source_name: String,
        #[source]
        source: csv::Error,
    },

    /// The file ends before the header or before any data row.
    #[error("{source_name} is missing its {part}")]
    Truncated {
        source_name: String,
        part: &'static str,
    },

    /// Required column not found in the header.
    #[error("required column '{column}' not found in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// A timestamp cell could not be parsed.
    #[error("invalid timestamp '{value}' on line {line} of {source_name}")]
    InvalidTimestamp {
        source_name: String,
        line: usize,
        value: String,
    },

    // === Network Errors ===
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),

    /// The station service returned nothing usable.
    #[error("no data retrieved for station {station_id}")]
    NoStationData { station_id: u32 },

    // === Frame Errors ===
    #[error(transparent)]
    Transform(#[from] TransformError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
