//! Time-indexed dataset type.
//!
//! A [`TimeFrame`] pairs a regular timestamp index with a Polars DataFrame
//! of `Float64` variables. Construction enforces the frame invariants:
//!
//! - the index advances by exactly one cadence step per row,
//! - every column has one value per timestamp,
//! - cells are finite or null.

use chrono::NaiveDateTime;
use flux_common::{column_names, float_column, float_values};
use polars::prelude::{Column, DataFrame};

use crate::cadence::Cadence;
use crate::error::{Result, TransformError};
use crate::records::Records;

/// A regular time series of numeric variables.
#[derive(Debug, Clone)]
pub struct TimeFrame {
    index: Vec<NaiveDateTime>,
    data: DataFrame,
    cadence: Cadence,
}

impl TimeFrame {
    /// Wraps a DataFrame, casting every column to `Float64`.
    pub fn new(index: Vec<NaiveDateTime>, data: DataFrame, cadence: Cadence) -> Result<Self> {
        check_grid(&index, cadence)?;
        if data.width() > 0 && data.height() != index.len() {
            return Err(TransformError::LengthMismatch {
                index: index.len(),
                rows: data.height(),
            });
        }
        let mut columns = Vec::with_capacity(data.width());
        for name in column_names(&data) {
            let values = float_values(&data, &name)
                .ok_or_else(|| TransformError::NonNumericColumn(name.clone()))?;
            columns.push(float_column(&name, &values));
        }
        Ok(Self {
            index,
            data: DataFrame::new(columns)?,
            cadence,
        })
    }

    /// Builds a frame from named value vectors.
    pub fn from_columns<S: Into<String>>(
        index: Vec<NaiveDateTime>,
        cadence: Cadence,
        columns: Vec<(S, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        check_grid(&index, cadence)?;
        let mut built: Vec<Column> = Vec::with_capacity(columns.len());
        for (name, values) in columns {
            let name = name.into();
            if values.len() != index.len() {
                return Err(TransformError::ColumnLength {
                    column: name,
                    len: values.len(),
                    height: index.len(),
                });
            }
            if built.iter().any(|column| column.name().as_str() == name) {
                return Err(TransformError::DuplicateColumn(name));
            }
            built.push(float_column(&name, &values));
        }
        Ok(Self {
            index,
            data: DataFrame::new(built)?,
            cadence,
        })
    }

    /// Builds a frame whose index starts at `start` and has one row per value.
    pub fn from_start<S: Into<String>>(
        start: NaiveDateTime,
        cadence: Cadence,
        columns: Vec<(S, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let height = columns.first().map_or(0, |(_, values)| values.len());
        let index = (0..height).map(|step| cadence.offset(start, step)).collect();
        Self::from_columns(index, cadence, columns)
    }

    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    pub fn data(&self) -> &DataFrame {
        &self.data
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    pub fn height(&self) -> usize {
        self.index.len()
    }

    pub fn width(&self) -> usize {
        self.data.width()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.index.first().copied()
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.index.last().copied()
    }

    pub fn column_names(&self) -> Vec<String> {
        column_names(&self.data)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Values of a column, or `None` when the column does not exist.
    pub fn values(&self, name: &str) -> Option<Vec<Option<f64>>> {
        float_values(&self.data, name)
    }

    /// Removes all-null columns, returning their names.
    pub fn drop_empty_columns(&mut self) -> Result<Vec<String>> {
        let empty: Vec<String> = self
            .data
            .get_columns()
            .iter()
            .filter(|column| column.null_count() == column.len())
            .map(|column| column.name().to_string())
            .collect();
        if !empty.is_empty() {
            let kept: Vec<Column> = self
                .data
                .get_columns()
                .iter()
                .filter(|column| !empty.iter().any(|name| column.name().as_str() == name))
                .cloned()
                .collect();
            self.data = DataFrame::new(kept)?;
        }
        Ok(empty)
    }

    /// Outer join on the time index.
    ///
    /// Both frames must share a cadence and lie on the same grid. The result
    /// spans both frames; rows present on one side only are missing on the
    /// other. Right-hand columns whose name already exists get `suffix`
    /// appended.
    pub fn join(&self, other: &TimeFrame, suffix: &str) -> Result<Self> {
        if self.cadence != other.cadence {
            return Err(TransformError::CadenceMismatch {
                left: self.cadence,
                right: other.cadence,
            });
        }
        let (start, end) = match (self.start(), self.end(), other.start(), other.end()) {
            (Some(a0), Some(a1), Some(b0), Some(b1)) => {
                if self.cadence.steps_between(a0, b0).is_none() {
                    return Err(TransformError::MisalignedIndex {
                        offset_seconds: (b0 - a0).num_seconds(),
                    });
                }
                (a0.min(b0), a1.max(b1))
            }
            (Some(a0), Some(a1), _, _) => (a0, a1),
            (_, _, Some(b0), Some(b1)) => (b0, b1),
            _ => (NaiveDateTime::MIN, NaiveDateTime::MIN),
        };
        let height = if self.is_empty() && other.is_empty() {
            0
        } else {
            self.cadence
                .steps_between(start, end)
                .and_then(|steps| usize::try_from(steps).ok())
                .map_or(0, |steps| steps + 1)
        };
        let index: Vec<NaiveDateTime> = (0..height)
            .map(|step| self.cadence.offset(start, step))
            .collect();

        let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::new();
        for (side, frame) in [(0, self), (1, other)] {
            let offset = frame
                .start()
                .and_then(|first| self.cadence.steps_between(start, first))
                .and_then(|steps| usize::try_from(steps).ok())
                .unwrap_or_default();
            for name in frame.column_names() {
                let Some(values) = frame.values(&name) else {
                    continue;
                };
                let mut placed = vec![None; height];
                placed[offset..offset + values.len()].copy_from_slice(&values);
                let name = if side == 1 && columns.iter().any(|(existing, _)| *existing == name)
                {
                    format!("{name}{suffix}")
                } else {
                    name
                };
                columns.push((name, placed));
            }
        }
        Self::from_columns(index, self.cadence, columns)
    }

    /// Copies the frame back into unaligned records.
    pub fn to_records(&self) -> Result<Records> {
        let columns = self
            .column_names()
            .into_iter()
            .filter_map(|name| self.values(&name).map(|values| (name, values)))
            .collect();
        Records::new(self.index.clone(), columns)
    }

    /// Re-grids the frame to another cadence by bucket means.
    pub fn resample(&self, cadence: Cadence) -> Result<Self> {
        self.to_records()?.resample(cadence)
    }

    /// Builds a regular frame from unsorted, possibly duplicated rows.
    pub fn from_records(records: &Records, cadence: Cadence) -> Result<Self> {
        records.resample(cadence)
    }
}

fn check_grid(index: &[NaiveDateTime], cadence: Cadence) -> Result<()> {
    for pair in index.windows(2) {
        if pair[1] - pair[0] != cadence.as_delta() {
            return Err(TransformError::IrregularIndex {
                cadence,
                at: flux_model::format_timestamp(pair[1]),
            });
        }
    }
    Ok(())
}
