//! Screening of a whole dataset against a rule set.

use std::collections::BTreeMap;

use flux_model::{
    DateRange, ExclusionReason, IssueKind, IssueSeverity, ReasonCounts, RuleSet, ScreeningIssue,
    ScreeningReport, ScreeningRule, VariableSummary,
};
use flux_transform::TimeFrame;
use tracing::{debug, info, info_span, warn};

use crate::dependency::{ScreenedColumns, dependency_mask};
use crate::error::{Result, ScreenError};
use crate::project::rename_project;
use crate::quality::{ScreenedVariable, ScreeningOptions, date_exclusion_mask, screen_variable};
use crate::range::screen_range;

/// Why each value of each output variable is missing.
pub type Provenance = BTreeMap<String, Vec<Option<ExclusionReason>>>;

/// Screened dataset with its provenance and report.
#[derive(Debug, Clone)]
pub struct ScreeningResult {
    /// One column per screened rule, named by output name, in rule order.
    pub frame: TimeFrame,
    pub provenance: Provenance,
    pub report: ScreeningReport,
}

/// Applies a rule set to datasets.
#[derive(Debug, Clone)]
pub struct ScreeningEngine<'a> {
    rules: &'a RuleSet,
    options: ScreeningOptions,
}

impl<'a> ScreeningEngine<'a> {
    pub fn new(rules: &'a RuleSet, options: ScreeningOptions) -> Self {
        Self { rules, options }
    }

    pub fn rules(&self) -> &RuleSet {
        self.rules
    }

    pub fn options(&self) -> &ScreeningOptions {
        &self.options
    }

    /// Screens every rule's variable.
    ///
    /// All variables are range screened first; dependency masks are then
    /// built from those range-screened values. A variable that cannot be
    /// screened is reported and left out; the others are still produced.
    pub fn screen(&self, dataset: &TimeFrame) -> Result<ScreeningResult> {
        let _span = info_span!("screen", rules = self.rules.len(), records = dataset.height())
            .entered();
        let mut report = ScreeningReport {
            records: dataset.height(),
            ..ScreeningReport::default()
        };

        let projection = rename_project(dataset, self.rules)?;
        for (section, column) in &projection.unavailable {
            report.issues.push(ScreeningIssue {
                kind: IssueKind::VariableUnavailable,
                severity: IssueSeverity::Warning,
                section: section.clone(),
                subject: column.clone(),
                message: format!("column {column} not found in dataset"),
            });
        }
        let projected = &projection.frame;

        let range_screened: ScreenedColumns = self
            .rules
            .iter()
            .filter_map(|rule| {
                let values = projected.values(&rule.output_name)?;
                Some((rule.output_name.clone(), screen_range(&values, &rule.range)))
            })
            .collect();

        let mut columns = Vec::with_capacity(range_screened.len());
        let mut provenance = Provenance::new();
        for rule in self.rules {
            let Some(values) = projected.values(&rule.output_name) else {
                continue;
            };
            match self.screen_rule(rule, dataset, &values, &range_screened, &mut report) {
                Ok(screened) => {
                    let counts = ReasonCounts::from_reasons(&screened.reasons);
                    debug!(
                        variable = %rule.output_name,
                        valid = screened.valid(),
                        range = counts.range,
                        dependency = counts.dependency,
                        quality_flag = counts.quality_flag,
                        "screened variable"
                    );
                    report.variables.push(VariableSummary {
                        section: rule.section.clone(),
                        input_column: rule.input_column.clone(),
                        output_name: rule.output_name.clone(),
                        records: values.len(),
                        valid: screened.valid(),
                        counts,
                    });
                    provenance.insert(rule.output_name.clone(), screened.reasons);
                    columns.push((rule.output_name.clone(), screened.values));
                }
                Err(error @ ScreenError::InvalidArgumentShape { .. }) => {
                    warn!(section = %rule.section, %error, "variable not screened");
                    report.issues.push(ScreeningIssue {
                        kind: IssueKind::InvalidArgumentShape,
                        severity: IssueSeverity::Error,
                        section: rule.section.clone(),
                        subject: rule.output_name.clone(),
                        message: error.to_string(),
                    });
                }
                Err(error) => return Err(error),
            }
        }

        let frame = TimeFrame::from_columns(dataset.index().to_vec(), dataset.cadence(), columns)?;
        info!(
            variables = report.variables.len(),
            unavailable = projection.unavailable.len(),
            warnings = report.warning_count(),
            errors = report.error_count(),
            "screening complete"
        );
        Ok(ScreeningResult {
            frame,
            provenance,
            report,
        })
    }

    fn screen_rule(
        &self,
        rule: &ScreeningRule,
        dataset: &TimeFrame,
        values: &[Option<f64>],
        range_screened: &ScreenedColumns,
        report: &mut ScreeningReport,
    ) -> Result<ScreenedVariable> {
        let exclusions: Vec<DateRange> = rule
            .exclusions
            .iter()
            .chain(&self.options.exclusions)
            .copied()
            .collect();
        let date_mask =
            (!exclusions.is_empty()).then(|| date_exclusion_mask(dataset.index(), &exclusions));

        let dependencies = rule.has_dependencies().then(|| {
            let mask = dependency_mask(rule, range_screened, values.len());
            for dependency in &mask.unresolved {
                report.issues.push(ScreeningIssue {
                    kind: IssueKind::DependencyUnresolved,
                    severity: IssueSeverity::Warning,
                    section: rule.section.clone(),
                    subject: dependency.clone(),
                    message: format!("dependency {dependency} is not a screened variable"),
                });
            }
            mask.mask
        });

        let flags = rule.quality_flag.as_ref().and_then(|column| {
            let flags = dataset.values(column);
            if flags.is_none() {
                warn!(
                    section = %rule.section,
                    column = %column,
                    "quality flag column not found, flag filter disabled"
                );
                report.issues.push(ScreeningIssue {
                    kind: IssueKind::QualityFlagUnavailable,
                    severity: IssueSeverity::Warning,
                    section: rule.section.clone(),
                    subject: column.clone(),
                    message: format!("quality flag column {column} not found in dataset"),
                });
            }
            flags
        });

        screen_variable(
            values,
            &rule.range,
            date_mask.as_deref(),
            dependencies.as_deref(),
            flags.as_deref(),
            self.options.flag_code,
        )
    }
}

/// Screens a dataset in one call.
pub fn screen_dataset(
    dataset: &TimeFrame,
    rules: &RuleSet,
    options: &ScreeningOptions,
) -> Result<ScreeningResult> {
    ScreeningEngine::new(rules, options.clone()).screen(dataset)
}
