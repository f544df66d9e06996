//! Unaligned rows as read from a source file.

use chrono::NaiveDateTime;
use flux_common::finite;

use crate::cadence::Cadence;
use crate::error::{Result, TransformError};
use crate::frame::TimeFrame;

/// Timestamped numeric rows before they are placed on a regular grid.
///
/// Timestamps may be unsorted, duplicated or irregular. Column order is the
/// order in which columns were first seen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Records {
    timestamps: Vec<NaiveDateTime>,
    columns: Vec<(String, Vec<Option<f64>>)>,
}

impl Records {
    pub fn new(
        timestamps: Vec<NaiveDateTime>,
        columns: Vec<(String, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        let height = timestamps.len();
        let mut seen = std::collections::BTreeSet::new();
        for (name, values) in &columns {
            if !seen.insert(name.as_str()) {
                return Err(TransformError::DuplicateColumn(name.clone()));
            }
            if values.len() != height {
                return Err(TransformError::ColumnLength {
                    column: name.clone(),
                    len: values.len(),
                    height,
                });
            }
        }
        let columns = columns
            .into_iter()
            .map(|(name, values)| (name, values.into_iter().map(finite).collect()))
            .collect();
        Ok(Self { timestamps, columns })
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn values(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns
            .iter()
            .find(|(column, _)| column == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Appends the rows of `other`.
    ///
    /// Columns present on only one side are padded with missing values.
    pub fn append(&mut self, other: Records) {
        let before = self.len();
        let added = other.len();
        for (_, values) in &mut self.columns {
            values.resize(before + added, None);
        }
        for (name, values) in other.columns {
            if let Some((_, existing)) = self.columns.iter_mut().find(|(column, _)| *column == name)
            {
                existing[before..].clone_from_slice(&values);
            } else {
                let mut padded = vec![None; before];
                padded.extend(values);
                self.columns.push((name, padded));
            }
        }
        self.timestamps.extend(other.timestamps);
    }

    /// Removes columns without a single value, returning their names.
    pub fn drop_empty_columns(&mut self) -> Vec<String> {
        let mut dropped = Vec::new();
        self.columns.retain(|(name, values)| {
            let keep = values.iter().any(Option::is_some);
            if !keep {
                dropped.push(name.clone());
            }
            keep
        });
        dropped
    }

    /// Places the rows on a regular grid.
    ///
    /// Each timestamp is floored to the cadence and the finite values of each
    /// bucket are averaged. Every bucket between the first and last one is
    /// emitted; buckets without data become rows of missing values.
    pub fn resample(&self, cadence: Cadence) -> Result<TimeFrame> {
        let buckets: Vec<NaiveDateTime> = self
            .timestamps
            .iter()
            .map(|timestamp| cadence.floor(*timestamp))
            .collect();
        let (Some(first), Some(last)) = (buckets.iter().min(), buckets.iter().max()) else {
            let empty = self
                .columns
                .iter()
                .map(|(name, _)| (name.clone(), Vec::new()))
                .collect();
            return TimeFrame::from_columns(Vec::new(), cadence, empty);
        };
        let span = cadence.steps_between(*first, *last).unwrap_or_default();
        let height = usize::try_from(span).unwrap_or_default() + 1;
        let index: Vec<NaiveDateTime> = (0..height)
            .map(|step| cadence.offset(*first, step))
            .collect();
        let positions: Vec<usize> = buckets
            .iter()
            .map(|bucket| {
                cadence
                    .steps_between(*first, *bucket)
                    .and_then(|step| usize::try_from(step).ok())
                    .unwrap_or_default()
            })
            .collect();

        let mut columns = Vec::with_capacity(self.columns.len());
        for (name, values) in &self.columns {
            let mut sums = vec![0.0; height];
            let mut counts = vec![0usize; height];
            for (position, value) in positions.iter().zip(values) {
                if let Some(value) = value {
                    sums[*position] += value;
                    counts[*position] += 1;
                }
            }
            let means = sums
                .into_iter()
                .zip(counts)
                .map(|(sum, count)| (count > 0).then(|| sum / count as f64))
                .collect();
            columns.push((name.clone(), means));
        }
        TimeFrame::from_columns(index, cadence, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_model::parse_timestamp;

    fn ts(raw: &str) -> NaiveDateTime {
        parse_timestamp(raw).unwrap()
    }

    #[test]
    fn append_pads_disjoint_columns() {
        let mut first = Records::new(
            vec![ts("2024-06-01 00:00")],
            vec![("TA".to_string(), vec![Some(1.0)])],
        )
        .unwrap();
        let second = Records::new(
            vec![ts("2024-06-01 00:30")],
            vec![("RH".to_string(), vec![Some(80.0)])],
        )
        .unwrap();
        first.append(second);
        assert_eq!(first.len(), 2);
        assert_eq!(first.values("TA"), Some(&[Some(1.0), None][..]));
        assert_eq!(first.values("RH"), Some(&[None, Some(80.0)][..]));
    }

    #[test]
    fn resample_averages_and_fills_gaps() {
        let records = Records::new(
            vec![
                ts("2024-06-01 01:10"),
                ts("2024-06-01 00:00"),
                ts("2024-06-01 01:20"),
                ts("2024-06-01 00:00"),
            ],
            vec![(
                "TA".to_string(),
                vec![Some(3.0), Some(1.0), Some(5.0), Some(f64::NAN)],
            )],
        )
        .unwrap();
        let frame = records.resample(Cadence::HALF_HOURLY).unwrap();
        assert_eq!(
            frame.index(),
            &[
                ts("2024-06-01 00:00"),
                ts("2024-06-01 00:30"),
                ts("2024-06-01 01:00")
            ]
        );
        assert_eq!(frame.values("TA"), Some(vec![Some(1.0), None, Some(4.0)]));
    }

    #[test]
    fn rejects_ragged_columns() {
        let result = Records::new(
            vec![ts("2024-06-01 00:00")],
            vec![("TA".to_string(), vec![Some(1.0), Some(2.0)])],
        );
        assert!(matches!(result, Err(TransformError::ColumnLength { .. })));
    }
}
