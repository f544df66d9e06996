//! Shared utilities for the flux screening crates.
//!
//! This crate provides the Polars helpers used across the workspace for
//! moving numeric columns in and out of DataFrames with a single notion of
//! "missing": a null cell. NaN and infinite values never leave these helpers.

pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use polars::{
    column_names, finite, float_column, float_values, format_numeric, parse_f64,
};
