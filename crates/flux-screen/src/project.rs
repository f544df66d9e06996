//! Renaming input columns to output variables.

use flux_model::RuleSet;
use flux_transform::TimeFrame;
use tracing::warn;

use crate::error::Result;

/// A dataset with one column per resolved rule, named by output name.
#[derive(Debug, Clone)]
pub struct Projection {
    pub frame: TimeFrame,
    /// `(section, input column)` of every rule whose column was not found.
    pub unavailable: Vec<(String, String)>,
}

/// Copies each rule's input column under its output name.
///
/// Columns no rule refers to are dropped. A rule whose input column is
/// absent is skipped with exactly one warning naming the column.
pub fn rename_project(dataset: &TimeFrame, rules: &RuleSet) -> Result<Projection> {
    let mut columns = Vec::with_capacity(rules.len());
    let mut unavailable = Vec::new();
    for rule in rules {
        match dataset.values(&rule.input_column) {
            Some(values) => columns.push((rule.output_name.clone(), values)),
            None => {
                warn!(
                    section = %rule.section,
                    column = %rule.input_column,
                    "variable unavailable: column {} not found",
                    rule.input_column
                );
                unavailable.push((rule.section.clone(), rule.input_column.clone()));
            }
        }
    }
    let frame = TimeFrame::from_columns(dataset.index().to_vec(), dataset.cadence(), columns)?;
    Ok(Projection { frame, unavailable })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_model::{ScreeningRule, ValueRange, parse_timestamp};
    use flux_transform::Cadence;

    #[test]
    fn renames_and_drops_unmapped_columns() {
        let dataset = TimeFrame::from_start(
            parse_timestamp("2024-06-01 00:00").unwrap(),
            Cadence::HALF_HOURLY,
            vec![
                ("AirTC_Avg", vec![Some(12.0)]),
                ("RECORD", vec![Some(1.0)]),
            ],
        )
        .unwrap();
        let range = ValueRange::new(-40.0, 50.0).unwrap();
        let mut rules = RuleSet::new();
        rules
            .insert(ScreeningRule::new("TA_1_1_1", "AirTC_Avg", "TA_1_1_1", range))
            .unwrap();
        rules
            .insert(ScreeningRule::new("TS_1_1_1", "Tsoil", "TS_1_1_1", range))
            .unwrap();

        let projection = rename_project(&dataset, &rules).unwrap();
        assert_eq!(projection.frame.column_names(), vec!["TA_1_1_1"]);
        assert_eq!(
            projection.unavailable,
            vec![("TS_1_1_1".to_string(), "Tsoil".to_string())]
        );
    }
}
