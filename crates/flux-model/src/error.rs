use thiserror::Error;

/// Errors raised while constructing rule types.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("range bounds must be finite (got {min}, {max})")]
    NonFiniteRange { min: f64, max: f64 },
    #[error("range minimum {min} is greater than maximum {max}")]
    InvertedRange { min: f64, max: f64 },
    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("invalid date range '{0}' (expected START/END)")]
    InvalidDateRange(String),
    #[error("date range starts after it ends: {0}")]
    InvertedDateRange(String),
    #[error("duplicate rule section '{0}'")]
    DuplicateSection(String),
    #[error("duplicate output variable '{output}' (sections {first} and {second})")]
    DuplicateOutput {
        output: String,
        first: String,
        second: String,
    },
}

pub type Result<T> = std::result::Result<T, ModelError>;
