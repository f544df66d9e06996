//! Output files of a screening run.

pub mod csv_writer;
pub mod error;
pub mod report;

use std::path::{Path, PathBuf};

pub use csv_writer::{TIMESTAMP_COLUMN, frame_to_csv_string, write_frame_csv, write_frame_csv_to};
pub use error::{OutputError, Result};
pub use report::{ReportDocument, write_report_json};

pub const SCREENED_CSV: &str = "screened.csv";
pub const REPORT_JSON: &str = "screening_report.json";

/// Files written into an output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub screened_csv: PathBuf,
    pub report_json: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            screened_csv: dir.join(SCREENED_CSV),
            report_json: dir.join(REPORT_JSON),
        }
    }
}
