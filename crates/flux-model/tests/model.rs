//! Tests for flux-model types.

use flux_model::{
    ExclusionReason, IssueKind, IssueSeverity, ReasonCounts, RuleSet, ScreeningIssue,
    ScreeningReport, ScreeningRule, ValueRange, VariableSummary,
};

fn issue(kind: IssueKind, severity: IssueSeverity, section: &str, subject: &str) -> ScreeningIssue {
    ScreeningIssue {
        kind,
        severity,
        section: section.to_string(),
        subject: subject.to_string(),
        message: String::new(),
    }
}

#[test]
fn screening_report_counts() {
    let report = ScreeningReport {
        records: 48,
        variables: vec![],
        issues: vec![
            issue(IssueKind::VariableUnavailable, IssueSeverity::Warning, "SWC", "SWC_Avg"),
            issue(IssueKind::DependencyUnresolved, IssueSeverity::Warning, "LE", "USTAR"),
            issue(IssueKind::InvalidArgumentShape, IssueSeverity::Error, "H", "qc_H"),
        ],
    };
    assert_eq!(report.error_count(), 1);
    assert_eq!(report.warning_count(), 2);
    assert!(report.has_errors());
    assert_eq!(report.unavailable(), vec!["SWC_Avg"]);
    assert_eq!(report.failures(), vec!["H"]);
}

#[test]
fn reason_counts_split_gaps_from_removals() {
    let reasons = vec![
        None,
        Some(ExclusionReason::Missing),
        Some(ExclusionReason::Range),
        Some(ExclusionReason::Range),
        Some(ExclusionReason::Dependency),
        Some(ExclusionReason::QualityFlag),
    ];
    let counts = ReasonCounts::from_reasons(&reasons);
    assert_eq!(counts.missing, 1);
    assert_eq!(counts.range, 2);
    assert_eq!(counts.removed(), 4);
    assert_eq!(counts.total_missing(), 5);
}

#[test]
fn report_serializes() {
    let report = ScreeningReport {
        records: 3,
        variables: vec![VariableSummary {
            section: "TA".to_string(),
            input_column: "AirTC".to_string(),
            output_name: "TA".to_string(),
            records: 3,
            valid: 2,
            counts: ReasonCounts {
                range: 1,
                ..ReasonCounts::default()
            },
        }],
        issues: vec![],
    };
    let json = serde_json::to_string(&report).expect("serialize report");
    assert!(json.contains("\"output_name\":\"TA\""));
    let round: ScreeningReport = serde_json::from_str(&json).expect("deserialize report");
    assert_eq!(round, report);
}

#[test]
fn rule_set_preserves_configuration_order() {
    let mut rules = RuleSet::new();
    for (section, output) in [("SW_IN", "SW_IN"), ("TA", "TA"), ("RH", "RH")] {
        rules
            .insert(ScreeningRule::new(
                section,
                section.to_lowercase(),
                output,
                ValueRange::new(0.0, 100.0).unwrap(),
            ))
            .unwrap();
    }
    assert_eq!(rules.output_names(), vec!["SW_IN", "TA", "RH"]);
    assert_eq!(rules.get("TA").map(|rule| rule.input_column.as_str()), Some("ta"));
    assert!(rules.by_output("VPD").is_none());
}
