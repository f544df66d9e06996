//! Composite screening of one variable.

use chrono::NaiveDateTime;
use flux_model::{DateRange, ExclusionReason, ValueRange};

use crate::error::{Result, ScreenError};

/// Mauder-Foken class that marks a flux as unusable.
pub const MAUDER_FOKEN_REJECT: f64 = 2.0;

/// Settings shared by every variable of a screening pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreeningOptions {
    /// Flag value that removes a data point.
    pub flag_code: f64,
    /// Exclusions applied to every variable in addition to the rule's own.
    pub exclusions: Vec<DateRange>,
}

impl Default for ScreeningOptions {
    fn default() -> Self {
        Self {
            flag_code: MAUDER_FOKEN_REJECT,
            exclusions: Vec::new(),
        }
    }
}

/// Screened values together with the reason each missing value is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenedVariable {
    pub values: Vec<Option<f64>>,
    pub reasons: Vec<Option<ExclusionReason>>,
}

impl ScreenedVariable {
    pub fn valid(&self) -> usize {
        self.values.iter().flatten().count()
    }
}

/// Marks the timestamps falling inside any of the ranges.
pub fn date_exclusion_mask(index: &[NaiveDateTime], exclusions: &[DateRange]) -> Vec<bool> {
    index
        .iter()
        .map(|timestamp| exclusions.iter().any(|range| range.contains(*timestamp)))
        .collect()
}

fn check_shape(argument: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(ScreenError::InvalidArgumentShape {
            argument,
            expected,
            actual,
        })
    }
}

/// Screens one variable and records why each removed value was removed.
///
/// Filters run in a fixed order and each only adds missingness:
///
/// 1. values outside `range`,
/// 2. timestamps marked in `date_exclusions`,
/// 3. non-finite values,
/// 4. rows marked in `dependency_mask`,
/// 5. rows whose quality flag equals `flag_code`.
///
/// A `None` filter is disabled. A missing flag never removes a value.
pub fn screen_variable(
    variable: &[Option<f64>],
    range: &ValueRange,
    date_exclusions: Option<&[bool]>,
    dependency_mask: Option<&[bool]>,
    quality_flags: Option<&[Option<f64>]>,
    flag_code: f64,
) -> Result<ScreenedVariable> {
    let len = variable.len();
    if let Some(mask) = date_exclusions {
        check_shape("date exclusion mask", len, mask.len())?;
    }
    if let Some(mask) = dependency_mask {
        check_shape("dependency mask", len, mask.len())?;
    }
    if let Some(flags) = quality_flags {
        check_shape("quality flags", len, flags.len())?;
    }

    let mut values = Vec::with_capacity(len);
    let mut reasons = Vec::with_capacity(len);
    for (row, value) in variable.iter().enumerate() {
        let reason = match value {
            None => Some(ExclusionReason::Missing),
            Some(v) if v.is_finite() && !range.contains(*v) => Some(ExclusionReason::Range),
            Some(_) if date_exclusions.is_some_and(|mask| mask[row]) => {
                Some(ExclusionReason::DateExclusion)
            }
            Some(v) if !v.is_finite() => Some(ExclusionReason::Missing),
            Some(_) if dependency_mask.is_some_and(|mask| mask[row]) => {
                Some(ExclusionReason::Dependency)
            }
            Some(_) if quality_flags.is_some_and(|flags| flags[row] == Some(flag_code)) => {
                Some(ExclusionReason::QualityFlag)
            }
            Some(_) => None,
        };
        values.push(if reason.is_some() { None } else { *value });
        reasons.push(reason);
    }
    Ok(ScreenedVariable { values, reasons })
}

/// Screens one variable with the Mauder-Foken class-2 flag code.
///
/// # Examples
///
/// ```
/// use flux_model::ValueRange;
/// use flux_screen::quality_screening;
///
/// let range = ValueRange::new(0.0, 100.0).unwrap();
/// let flags = [Some(0.0), Some(2.0), Some(1.0)];
/// let screened =
///     quality_screening(&[Some(5.0), Some(6.0), Some(7.0)], &range, None, None, Some(&flags))
///         .unwrap();
/// assert_eq!(screened, vec![Some(5.0), None, Some(7.0)]);
/// ```
pub fn quality_screening(
    variable: &[Option<f64>],
    range: &ValueRange,
    date_exclusions: Option<&[bool]>,
    dependency_mask: Option<&[bool]>,
    quality_flags: Option<&[Option<f64>]>,
) -> Result<Vec<Option<f64>>> {
    screen_variable(
        variable,
        range,
        date_exclusions,
        dependency_mask,
        quality_flags,
        MAUDER_FOKEN_REJECT,
    )
    .map(|screened| screened.values)
}
