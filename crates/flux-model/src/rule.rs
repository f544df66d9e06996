//! Screening rule types.
//!
//! A [`RuleSet`] is built once from a configuration file and is read-only
//! afterwards. Each [`ScreeningRule`] maps one input column to one output
//! variable and carries the physical range, the dependency list, an optional
//! quality-flag column and explicit date exclusions for that variable.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::timestamp::{format_timestamp, parse_period_end, parse_timestamp};

/// Inclusive physical range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    min: f64,
    max: f64,
}

impl ValueRange {
    /// Creates a range, rejecting non-finite or inverted bounds.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ModelError::NonFiniteRange { min, max });
        }
        if min > max {
            return Err(ModelError::InvertedRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// True when `value` lies inside the bounds. NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Inclusive timestamp interval used for explicit date exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(ModelError::InvertedDateRange(format!(
                "{}/{}",
                format_timestamp(start),
                format_timestamp(end)
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

impl FromStr for DateRange {
    type Err = ModelError;

    /// Parses `START/END`. A single timestamp excludes exactly that instant.
    ///
    /// A bare-date end runs to the end of that day; a bare-date start is
    /// midnight.
    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (start_raw, end_raw) = match trimmed.split_once('/') {
            Some((start, end)) => (start, end),
            None => (trimmed, trimmed),
        };
        let start = parse_timestamp(start_raw)
            .ok_or_else(|| ModelError::InvalidDateRange(trimmed.to_string()))?;
        let end = parse_period_end(end_raw)
            .ok_or_else(|| ModelError::InvalidDateRange(trimmed.to_string()))?;
        Self::new(start, end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            format_timestamp(self.start),
            format_timestamp(self.end)
        )
    }
}

/// One screening rule for one logical variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningRule {
    /// Section identifier in the configuration file (e.g. `TA_1_1_1`).
    pub section: String,
    /// Column name in the ingested dataset (e.g. `AirTC_Avg`).
    pub input_column: String,
    /// Standardized output variable name (e.g. `TA_1_1_1`).
    pub output_name: String,
    pub range: ValueRange,
    /// Output names of the variables this one depends on.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Dataset column holding Mauder-Foken quality flags for this variable.
    #[serde(default)]
    pub quality_flag: Option<String>,
    #[serde(default)]
    pub exclusions: Vec<DateRange>,
}

impl ScreeningRule {
    pub fn new(
        section: impl Into<String>,
        input_column: impl Into<String>,
        output_name: impl Into<String>,
        range: ValueRange,
    ) -> Self {
        Self {
            section: section.into(),
            input_column: input_column.into(),
            output_name: output_name.into(),
            range,
            dependencies: Vec::new(),
            quality_flag: None,
            exclusions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_dependencies<I, S>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = dependencies.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_quality_flag(mut self, column: impl Into<String>) -> Self {
        self.quality_flag = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_exclusions(mut self, exclusions: Vec<DateRange>) -> Self {
        self.exclusions = exclusions;
        self
    }

    pub fn has_dependencies(&self) -> bool {
        !self.dependencies.is_empty()
    }
}

/// Ordered, immutable collection of screening rules.
///
/// Configuration order is preserved and defines the column order of the
/// screened output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<ScreeningRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule. Section names and output names must be unique.
    pub fn insert(&mut self, rule: ScreeningRule) -> Result<()> {
        if self.get(&rule.section).is_some() {
            return Err(ModelError::DuplicateSection(rule.section));
        }
        if let Some(existing) = self.by_output(&rule.output_name) {
            return Err(ModelError::DuplicateOutput {
                output: rule.output_name.clone(),
                first: existing.section.clone(),
                second: rule.section,
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn get(&self, section: &str) -> Option<&ScreeningRule> {
        self.rules.iter().find(|rule| rule.section == section)
    }

    pub fn by_output(&self, output_name: &str) -> Option<&ScreeningRule> {
        self.rules
            .iter()
            .find(|rule| rule.output_name == output_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScreeningRule> {
        self.rules.iter()
    }

    pub fn rules(&self) -> &[ScreeningRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn output_names(&self) -> Vec<&str> {
        self.rules
            .iter()
            .map(|rule| rule.output_name.as_str())
            .collect()
    }

    /// Groups of output names that depend on each other, directly or through
    /// other rules. A self-dependency forms a group of one.
    ///
    /// Dependencies naming variables outside the set are ignored.
    pub fn dependency_cycles(&self) -> Vec<Vec<String>> {
        let edges: BTreeMap<&str, Vec<&str>> = self
            .rules
            .iter()
            .map(|rule| {
                let targets = rule
                    .dependencies
                    .iter()
                    .map(String::as_str)
                    .filter(|dep| self.by_output(dep).is_some())
                    .collect();
                (rule.output_name.as_str(), targets)
            })
            .collect();

        let reachable: BTreeMap<&str, BTreeSet<&str>> = edges
            .keys()
            .map(|start| (*start, reach(&edges, start)))
            .collect();

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut cycles = Vec::new();
        for (node, targets) in &reachable {
            if seen.contains(*node) || !targets.contains(node) {
                continue;
            }
            let group: Vec<String> = reachable
                .iter()
                .filter(|(other, other_targets)| {
                    targets.contains(*other) && other_targets.contains(node)
                })
                .map(|(other, _)| other.to_string())
                .collect();
            for member in &group {
                seen.insert(member.clone());
            }
            seen.insert(node.to_string());
            cycles.push(group);
        }
        cycles
    }
}

fn reach<'a>(edges: &BTreeMap<&'a str, Vec<&'a str>>, start: &str) -> BTreeSet<&'a str> {
    let mut visited = BTreeSet::new();
    let mut stack: Vec<&str> = edges.get(start).cloned().unwrap_or_default();
    while let Some(next) = stack.pop() {
        if visited.insert(next) {
            if let Some(targets) = edges.get(next) {
                stack.extend(targets.iter().copied());
            }
        }
    }
    visited
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a ScreeningRule;
    type IntoIter = std::slice::Iter<'a, ScreeningRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64) -> ValueRange {
        ValueRange::new(min, max).unwrap()
    }

    #[test]
    fn range_rejects_inverted_and_non_finite_bounds() {
        assert!(matches!(
            ValueRange::new(50.0, -40.0),
            Err(ModelError::InvertedRange { .. })
        ));
        assert!(matches!(
            ValueRange::new(f64::NAN, 1.0),
            Err(ModelError::NonFiniteRange { .. })
        ));
        assert!(ValueRange::new(1.0, 1.0).is_ok());
    }

    #[test]
    fn range_is_inclusive() {
        let r = range(-40.0, 50.0);
        assert!(r.contains(-40.0));
        assert!(r.contains(50.0));
        assert!(!r.contains(50.0001));
        assert!(!r.contains(f64::NAN));
    }

    #[test]
    fn date_range_parses_start_end() {
        let parsed: DateRange = "2024-06-01 00:00/2024-06-02 12:30".parse().unwrap();
        assert_eq!(parsed.to_string(), "2024-06-01 00:00/2024-06-02 12:30");
        assert!("2024-06-02/2024-06-01".parse::<DateRange>().is_err());
        assert!("tomorrow".parse::<DateRange>().is_err());
    }

    #[test]
    fn date_only_range_covers_whole_days() {
        let days: DateRange = "2024-06-01/2024-06-02".parse().unwrap();
        assert!(days.contains(parse_timestamp("2024-06-02 23:30").unwrap()));
        assert!(!days.contains(parse_timestamp("2024-06-03 00:00").unwrap()));

        let one_day: DateRange = "2024-06-01".parse().unwrap();
        assert!(one_day.contains(parse_timestamp("2024-06-01 12:00").unwrap()));
    }

    #[test]
    fn insert_rejects_duplicates() {
        let mut rules = RuleSet::new();
        rules
            .insert(ScreeningRule::new("TA", "AirTC", "TA", range(-40.0, 50.0)))
            .unwrap();
        assert!(matches!(
            rules.insert(ScreeningRule::new("TA", "AirTC2", "TA2", range(0.0, 1.0))),
            Err(ModelError::DuplicateSection(_))
        ));
        assert!(matches!(
            rules.insert(ScreeningRule::new("TA2", "AirTC2", "TA", range(0.0, 1.0))),
            Err(ModelError::DuplicateOutput { .. })
        ));
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn detects_dependency_cycles() {
        let mut rules = RuleSet::new();
        rules
            .insert(ScreeningRule::new("A", "a", "A", range(0.0, 1.0)).with_dependencies(["B"]))
            .unwrap();
        rules
            .insert(ScreeningRule::new("B", "b", "B", range(0.0, 1.0)).with_dependencies(["A"]))
            .unwrap();
        rules
            .insert(ScreeningRule::new("C", "c", "C", range(0.0, 1.0)).with_dependencies(["C"]))
            .unwrap();
        rules
            .insert(
                ScreeningRule::new("D", "d", "D", range(0.0, 1.0)).with_dependencies(["A", "X"]),
            )
            .unwrap();

        let cycles = rules.dependency_cycles();
        assert_eq!(
            cycles,
            vec![
                vec!["A".to_string(), "B".to_string()],
                vec!["C".to_string()]
            ]
        );
    }
}
