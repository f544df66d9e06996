use serde::{Deserialize, Serialize};

/// Why a value is missing in the screened output.
///
/// The first step that removed a value is recorded; later steps never
/// overwrite it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    /// Already missing (null, NaN or infinite) in the input.
    Missing,
    /// Outside the rule's physical range.
    Range,
    /// Inside an explicit date exclusion.
    DateExclusion,
    /// A dependency was missing after range screening.
    Dependency,
    /// Mauder-Foken quality class 2.
    QualityFlag,
}

impl ExclusionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Range => "range",
            Self::DateExclusion => "date_exclusion",
            Self::Dependency => "dependency",
            Self::QualityFlag => "quality_flag",
        }
    }
}

/// Per-reason counts of missing values for one variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonCounts {
    pub missing: usize,
    pub range: usize,
    pub date_exclusion: usize,
    pub dependency: usize,
    pub quality_flag: usize,
}

impl ReasonCounts {
    pub fn from_reasons<'a>(reasons: impl IntoIterator<Item = &'a Option<ExclusionReason>>) -> Self {
        let mut counts = Self::default();
        for reason in reasons.into_iter().flatten() {
            counts.add(*reason);
        }
        counts
    }

    pub fn add(&mut self, reason: ExclusionReason) {
        match reason {
            ExclusionReason::Missing => self.missing += 1,
            ExclusionReason::Range => self.range += 1,
            ExclusionReason::DateExclusion => self.date_exclusion += 1,
            ExclusionReason::Dependency => self.dependency += 1,
            ExclusionReason::QualityFlag => self.quality_flag += 1,
        }
    }

    /// Values removed by screening (pre-existing gaps excluded).
    pub fn removed(&self) -> usize {
        self.range + self.date_exclusion + self.dependency + self.quality_flag
    }

    pub fn total_missing(&self) -> usize {
        self.missing + self.removed()
    }
}

/// Summary of one screened output variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSummary {
    pub section: String,
    pub input_column: String,
    pub output_name: String,
    pub records: usize,
    pub valid: usize,
    pub counts: ReasonCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// The rule's input column is not in the dataset.
    VariableUnavailable,
    /// A declared dependency names no screened variable.
    DependencyUnresolved,
    /// The rule's quality-flag column is not in the dataset.
    QualityFlagUnavailable,
    /// A mask or flag array does not match the variable's length.
    InvalidArgumentShape,
}

/// A diagnostic produced while screening a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    /// Rule section the issue belongs to.
    pub section: String,
    /// Column, dependency or flag name the issue is about.
    pub subject: String,
    pub message: String,
}

/// Outcome of one screening pass over a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub records: usize,
    pub variables: Vec<VariableSummary>,
    pub issues: Vec<ScreeningIssue>,
}

impl ScreeningReport {
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &ScreeningIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    /// Input columns that were not found in the dataset.
    pub fn unavailable(&self) -> Vec<&str> {
        self.issues_of(IssueKind::VariableUnavailable)
            .map(|issue| issue.subject.as_str())
            .collect()
    }

    /// Sections whose screening was aborted.
    pub fn failures(&self) -> Vec<&str> {
        self.issues_of(IssueKind::InvalidArgumentShape)
            .map(|issue| issue.section.as_str())
            .collect()
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == IssueSeverity::Warning)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    pub fn variable(&self, output_name: &str) -> Option<&VariableSummary> {
        self.variables
            .iter()
            .find(|summary| summary.output_name == output_name)
    }
}
