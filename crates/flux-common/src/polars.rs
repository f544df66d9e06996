//! Polars value and column helpers.
//!
//! Every dataset in the workspace stores its variables as `Float64` columns
//! where null means "missing". These helpers enforce that convention at the
//! boundaries: values read out of a frame and values written back into one
//! are always either finite or `None`.

use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

/// Returns the value only when it is a finite number.
///
/// # Examples
///
/// ```
/// use flux_common::finite;
///
/// assert_eq!(finite(Some(1.5)), Some(1.5));
/// assert_eq!(finite(Some(f64::NAN)), None);
/// assert_eq!(finite(Some(f64::INFINITY)), None);
/// assert_eq!(finite(None), None);
/// ```
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Formats a floating-point number as a string without trailing zeros.
///
/// # Examples
///
/// ```
/// use flux_common::format_numeric;
///
/// assert_eq!(format_numeric(1.0), "1");
/// assert_eq!(format_numeric(1.5), "1.5");
/// assert_eq!(format_numeric(-40.0), "-40");
/// assert_eq!(format_numeric(0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a string as a finite `f64`, returning `None` for invalid, empty,
/// or non-finite strings (`"NAN"`, `"inf"`).
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim().trim_matches('"');
    if trimmed.is_empty() {
        return None;
    }
    finite(trimmed.parse::<f64>().ok())
}

/// Reads a column as a vector of finite values.
///
/// Returns `None` when the column does not exist or cannot be cast to
/// `Float64`. Nulls and non-finite values come back as `None`.
pub fn float_values(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
    let column = df.column(name).ok()?;
    let casted = column.cast(&DataType::Float64).ok()?;
    let chunked = casted.f64().ok()?;
    Some(chunked.into_iter().map(finite).collect())
}

/// Builds a `Float64` column, writing non-finite values as null.
pub fn float_column(name: &str, values: &[Option<f64>]) -> Column {
    let cleaned: Vec<Option<f64>> = values.iter().map(|v| finite(*v)).collect();
    Series::new(name.into(), cleaned).into_column()
}

/// Returns the column names of a frame as owned strings, in frame order.
pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}
