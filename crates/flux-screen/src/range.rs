//! Physical range screening.

use flux_model::ValueRange;

/// Replaces values outside the inclusive range with missing.
///
/// Non-finite values come out missing. The input is not modified.
///
/// # Examples
///
/// ```
/// use flux_model::ValueRange;
/// use flux_screen::screen_range;
///
/// let range = ValueRange::new(-40.0, 50.0).unwrap();
/// let screened = screen_range(&[Some(-50.0), Some(10.0), Some(50.0), None], &range);
/// assert_eq!(screened, vec![None, Some(10.0), Some(50.0), None]);
/// ```
pub fn screen_range(values: &[Option<f64>], range: &ValueRange) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|value| value.filter(|v| range.contains(*v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_are_missing() {
        let range = ValueRange::new(-1.0e9, 1.0e9).unwrap();
        assert_eq!(
            screen_range(&[Some(f64::NAN), Some(f64::NEG_INFINITY), Some(0.0)], &range),
            vec![None, None, Some(0.0)]
        );
    }

    #[test]
    fn degenerate_range_keeps_only_the_bound() {
        let range = ValueRange::new(1.0, 1.0).unwrap();
        assert_eq!(
            screen_range(&[Some(0.999), Some(1.0), Some(1.001)], &range),
            vec![None, Some(1.0), None]
        );
    }
}
