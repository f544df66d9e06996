//! Dependency propagation between screened variables.
//!
//! A variable with dependencies is missing wherever any of its dependencies
//! is missing after range screening. Masks are always built from the
//! range-screened values, never from values already removed by
//! propagation, so a chain `A -> B -> C` only removes `A` where `B` itself
//! was out of range or absent.

use std::collections::BTreeMap;

use flux_model::{RuleSet, ScreeningRule};
use tracing::warn;

/// Range-screened values keyed by output name.
pub type ScreenedColumns = BTreeMap<String, Vec<Option<f64>>>;

/// Missingness mask of one rule's dependencies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyMask {
    /// `true` where at least one dependency is missing.
    pub mask: Vec<bool>,
    /// Dependencies that name no screened variable.
    pub unresolved: Vec<String>,
}

/// Builds the dependency mask of `rule` over `len` rows.
///
/// Unresolved dependencies contribute no missingness and are logged here,
/// once per rule and dependency.
pub fn dependency_mask(rule: &ScreeningRule, screened: &ScreenedColumns, len: usize) -> DependencyMask {
    let mut mask = vec![false; len];
    let mut unresolved = Vec::new();
    for dependency in &rule.dependencies {
        let Some(values) = screened.get(dependency) else {
            warn!(
                section = %rule.section,
                dependency = %dependency,
                "dependency does not name a screened variable"
            );
            unresolved.push(dependency.clone());
            continue;
        };
        for (flag, value) in mask.iter_mut().zip(values) {
            *flag |= value.is_none();
        }
    }
    DependencyMask { mask, unresolved }
}

/// Result of propagating dependencies over a screened set.
#[derive(Debug, Clone, PartialEq)]
pub struct Propagation {
    pub columns: ScreenedColumns,
    /// `(section, dependency)` pairs that could not be resolved.
    pub unresolved: Vec<(String, String)>,
}

/// Applies every rule's dependency mask to the range-screened columns.
///
/// Returns new columns; `screened` is left untouched.
pub fn propagate_dependencies(screened: &ScreenedColumns, rules: &RuleSet) -> Propagation {
    let mut columns = screened.clone();
    let mut unresolved = Vec::new();
    for rule in rules.iter().filter(|rule| rule.has_dependencies()) {
        let Some(target) = columns.get_mut(&rule.output_name) else {
            continue;
        };
        let DependencyMask { mask, unresolved: missing } =
            dependency_mask(rule, screened, target.len());
        unresolved.extend(
            missing
                .into_iter()
                .map(|dependency| (rule.section.clone(), dependency)),
        );
        for (value, masked) in target.iter_mut().zip(mask) {
            if masked {
                *value = None;
            }
        }
    }
    Propagation { columns, unresolved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_model::ValueRange;

    fn rule(name: &str, dependencies: &[&str]) -> ScreeningRule {
        ScreeningRule::new(name, name, name, ValueRange::new(0.0, 100.0).unwrap())
            .with_dependencies(dependencies.iter().copied())
    }

    #[test]
    fn propagation_is_single_hop() {
        let mut rules = RuleSet::new();
        rules.insert(rule("A", &["B"])).unwrap();
        rules.insert(rule("B", &["C"])).unwrap();
        rules.insert(rule("C", &[])).unwrap();
        let screened: ScreenedColumns = [
            ("A".to_string(), vec![Some(1.0), Some(2.0)]),
            ("B".to_string(), vec![Some(1.0), Some(2.0)]),
            ("C".to_string(), vec![None, Some(2.0)]),
        ]
        .into_iter()
        .collect();

        let result = propagate_dependencies(&screened, &rules);
        assert_eq!(result.columns["B"], vec![None, Some(2.0)]);
        assert_eq!(result.columns["A"], vec![Some(1.0), Some(2.0)]);
        assert!(result.unresolved.is_empty());
        assert_eq!(screened["B"], vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn unresolved_dependencies_do_not_mask() {
        let mut rules = RuleSet::new();
        rules.insert(rule("A", &["GHOST"])).unwrap();
        let screened: ScreenedColumns =
            [("A".to_string(), vec![Some(1.0), None])].into_iter().collect();
        let result = propagate_dependencies(&screened, &rules);
        assert_eq!(result.columns["A"], vec![Some(1.0), None]);
        assert_eq!(
            result.unresolved,
            vec![("A".to_string(), "GHOST".to_string())]
        );
    }
}
