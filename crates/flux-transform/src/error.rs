use polars::prelude::PolarsError;
use thiserror::Error;

use crate::cadence::Cadence;

/// Errors raised while building or reshaping a [`TimeFrame`](crate::TimeFrame).
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("index has {index} timestamps but data has {rows} rows")]
    LengthMismatch { index: usize, rows: usize },

    #[error("index is not a regular {cadence} grid at {at}")]
    IrregularIndex { cadence: Cadence, at: String },

    #[error("column '{0}' is not numeric")]
    NonNumericColumn(String),

    #[error("column '{column}' has {len} values but the frame has {height} rows")]
    ColumnLength {
        column: String,
        len: usize,
        height: usize,
    },

    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    #[error("missing column '{0}'")]
    MissingColumn(String),

    #[error("cannot join a {left} frame with a {right} frame")]
    CadenceMismatch { left: Cadence, right: Cadence },

    #[error("time grids are offset by {offset_seconds} s")]
    MisalignedIndex { offset_seconds: i64 },

    #[error("invalid cadence '{0}'")]
    InvalidCadence(String),

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, TransformError>;
