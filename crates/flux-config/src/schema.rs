//! Format-agnostic rule section schema.
//!
//! INI and YAML files are both reduced to [`RawSection`]s before any rule
//! is built, so key aliases, range parsing and dependency parsing have a
//! single implementation.
//!
//! | Field          | Accepted keys (case, `_` and `-` ignored)  |
//! |----------------|--------------------------------------------|
//! | input column   | `inputFileName`                            |
//! | output name    | `variableName`                             |
//! | range          | `minMax`                                   |
//! | dependencies   | `dependent`, `dependencies`                |
//! | quality flag   | `qcFlag`, `flag`                           |
//! | exclusions     | `exclude`, `exclusions`                    |
//!
//! Each exclusion is `START/END`, both ends inclusive. A bare-date END
//! covers that whole day.

use flux_model::{DateRange, ScreeningRule, ValueRange};
use tracing::debug;

use crate::error::ConfigError;

/// A configuration value before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

impl RawValue {
    fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::List(items) => format!("[{}]", items.join(", ")),
        }
    }
}

/// A section as read from a file, or the reason it could not be read.
pub(crate) type SectionResult = Result<RawSection, ConfigError>;

/// One section of a rule file with its entries in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSection {
    pub name: String,
    pub entries: Vec<(String, RawValue)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    InputColumn,
    OutputName,
    Range,
    Dependencies,
    QualityFlag,
    Exclusions,
}

impl Field {
    fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "inputfilename" => Some(Self::InputColumn),
            "variablename" => Some(Self::OutputName),
            "minmax" => Some(Self::Range),
            "dependent" | "dependencies" => Some(Self::Dependencies),
            "qcflag" | "flag" => Some(Self::QualityFlag),
            "exclude" | "exclusions" => Some(Self::Exclusions),
            _ => None,
        }
    }
}

impl RawSection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, key: impl Into<String>, value: RawValue) {
        self.entries.push((key.into(), value));
    }

    fn field(&self, field: Field) -> Option<&RawValue> {
        self.entries
            .iter()
            .find(|(key, _)| Field::from_key(key) == Some(field))
            .map(|(_, value)| value)
    }

    /// Builds a validated rule from this section.
    pub fn to_rule(&self) -> Result<ScreeningRule, ConfigError> {
        for (key, _) in &self.entries {
            if Field::from_key(key).is_none() {
                debug!(section = %self.name, key = %key, "ignoring unknown rule key");
            }
        }

        let input_column = self.required_text(Field::InputColumn, "inputFileName")?;
        let output_name = self.required_text(Field::OutputName, "variableName")?;
        let range_value = self
            .field(Field::Range)
            .ok_or_else(|| ConfigError::MissingKey {
                section: self.name.clone(),
                key: "minMax",
            })?;
        let range = parse_range(range_value).map_err(|reason| ConfigError::InvalidRange {
            section: self.name.clone(),
            value: range_value.display(),
            reason,
        })?;

        let dependencies = self
            .field(Field::Dependencies)
            .map(parse_list)
            .unwrap_or_default();

        let quality_flag = match self.field(Field::QualityFlag) {
            Some(RawValue::Text(text)) => {
                let cleaned = clean_item(text);
                (!cleaned.is_empty()).then_some(cleaned)
            }
            Some(RawValue::List(_)) => {
                return Err(ConfigError::InvalidValue {
                    section: self.name.clone(),
                    key: "qcFlag",
                    reason: "expected a single column name".to_string(),
                });
            }
            None => None,
        };

        let mut exclusions = Vec::new();
        if let Some(value) = self.field(Field::Exclusions) {
            for item in parse_list(value) {
                let parsed = item
                    .parse::<DateRange>()
                    .map_err(|source| ConfigError::InvalidExclusion {
                        section: self.name.clone(),
                        source,
                    })?;
                exclusions.push(parsed);
            }
        }

        let rule = ScreeningRule::new(&self.name, input_column, output_name, range)
            .with_dependencies(dependencies)
            .with_exclusions(exclusions);
        Ok(match quality_flag {
            Some(column) => rule.with_quality_flag(column),
            None => rule,
        })
    }

    fn required_text(&self, field: Field, key: &'static str) -> Result<String, ConfigError> {
        match self.field(field) {
            Some(RawValue::Text(text)) if !clean_item(text).is_empty() => Ok(clean_item(text)),
            Some(RawValue::List(_)) => Err(ConfigError::InvalidValue {
                section: self.name.clone(),
                key,
                reason: "expected a single column name".to_string(),
            }),
            _ => Err(ConfigError::MissingKey {
                section: self.name.clone(),
                key,
            }),
        }
    }
}

const BRACKETS: &[char] = &['[', ']', '(', ')', '{', '}'];

fn clean_item(raw: &str) -> String {
    raw.trim().trim_matches(|ch| ch == '"' || ch == '\'').trim().to_string()
}

/// Parses a two-element numeric range, tolerant of surrounding brackets.
///
/// Accepts `[-40, 50]`, `(-40,50)`, `-40, 50` or a two-element list.
pub fn parse_range(value: &RawValue) -> Result<ValueRange, String> {
    let parts: Vec<String> = match value {
        RawValue::Text(text) => text
            .trim()
            .trim_matches(BRACKETS)
            .split(',')
            .map(clean_item)
            .collect(),
        RawValue::List(items) => items.iter().map(|item| clean_item(item)).collect(),
    };
    if parts.len() != 2 {
        return Err(format!("expected two values, found {}", parts.len()));
    }
    let min = parse_bound(&parts[0])?;
    let max = parse_bound(&parts[1])?;
    ValueRange::new(min, max).map_err(|error| error.to_string())
}

fn parse_bound(raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("'{raw}' is not a number"))
}

/// Parses a list of names, tolerant of brackets, quotes and empty items.
pub fn parse_list(value: &RawValue) -> Vec<String> {
    let items: Vec<String> = match value {
        RawValue::Text(text) => text
            .trim()
            .trim_matches(BRACKETS)
            .split(',')
            .map(clean_item)
            .collect(),
        RawValue::List(items) => items.iter().map(|item| clean_item(item)).collect(),
    };
    items.into_iter().filter(|item| !item.is_empty()).collect()
}
