//! Gap filling on a regular grid.

use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::Result;
use crate::frame::TimeFrame;

impl TimeFrame {
    /// Linear-in-time interpolation of interior gaps.
    ///
    /// Leading and trailing gaps are left missing; see [`TimeFrame::fill_edges`].
    pub fn interpolate_time(&self) -> Result<Self> {
        self.map_columns(|index, values| interpolate_series(index, values))
    }

    /// Backward fill followed by forward fill.
    ///
    /// After interpolation only the edges remain missing, so this extends the
    /// first and last observations outwards. A column without any value stays
    /// empty.
    pub fn fill_edges(&self) -> Result<Self> {
        self.map_columns(|_, values| forward_fill(&backward_fill(values)))
    }

    fn map_columns<F>(&self, mut apply: F) -> Result<Self>
    where
        F: FnMut(&[NaiveDateTime], &[Option<f64>]) -> Vec<Option<f64>>,
    {
        let mut columns = Vec::with_capacity(self.width());
        for name in self.column_names() {
            if let Some(values) = self.values(&name) {
                let filled = apply(self.index(), &values);
                let added = count_missing(&values) - count_missing(&filled);
                if added > 0 {
                    debug!(column = %name, filled = added, "filled gaps");
                }
                columns.push((name, filled));
            }
        }
        Self::from_columns(self.index().to_vec(), self.cadence(), columns)
    }
}

fn count_missing(values: &[Option<f64>]) -> usize {
    values.iter().filter(|value| value.is_none()).count()
}

/// Interpolates missing values between known neighbours, weighted by time.
pub fn interpolate_series(index: &[NaiveDateTime], values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let mut previous: Option<usize> = None;
    for position in 0..values.len() {
        let Some(current) = values[position] else {
            continue;
        };
        if let Some(start) = previous
            && position > start + 1
            && let Some(origin) = values[start]
        {
            let span = (index[position] - index[start]).num_seconds() as f64;
            for gap in start + 1..position {
                let elapsed = (index[gap] - index[start]).num_seconds() as f64;
                result[gap] = Some(origin + (current - origin) * elapsed / span);
            }
        }
        previous = Some(position);
    }
    result
}

pub fn backward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let mut next = None;
    for value in result.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
    result
}

pub fn forward_fill(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut result = values.to_vec();
    let mut last = None;
    for value in &mut result {
        match value {
            Some(v) => last = Some(*v),
            None => *value = last,
        }
    }
    result
}
