//! End-to-end screening scenarios.

use std::io::Write;
use std::sync::{Arc, Mutex};

use flux_config::{RuleFormat, parse_rules};
use flux_model::{
    DateRange, ExclusionReason, IssueKind, RuleSet, ScreeningRule, ValueRange, parse_timestamp,
};
use flux_screen::{
    ScreenedColumns, ScreeningOptions, propagate_dependencies, quality_screening, screen_dataset,
    screen_range,
};
use flux_transform::{Cadence, TimeFrame};
use tracing_subscriber::fmt::MakeWriter;

fn frame(columns: Vec<(&str, Vec<Option<f64>>)>) -> TimeFrame {
    TimeFrame::from_start(
        parse_timestamp("2024-06-01 00:00").unwrap(),
        Cadence::HALF_HOURLY,
        columns,
    )
    .unwrap()
}

fn range(min: f64, max: f64) -> ValueRange {
    ValueRange::new(min, max).unwrap()
}

#[test]
fn out_of_range_values_are_removed() {
    let screened = screen_range(
        &[Some(-50.0), Some(10.0), Some(20.0), Some(9999.0)],
        &range(-40.0, 50.0),
    );
    assert_eq!(screened, vec![None, Some(10.0), Some(20.0), None]);

    let rules = parse_rules(
        "[TA]\ninputFileName = AirTC\nvariableName = TA\nminMax = [-40, 50]\n",
        RuleFormat::Ini,
    )
    .unwrap()
    .rules;
    let dataset = frame(vec![(
        "AirTC",
        vec![Some(-50.0), Some(10.0), Some(20.0), Some(9999.0)],
    )]);
    let result = screen_dataset(&dataset, &rules, &ScreeningOptions::default()).unwrap();
    assert_eq!(
        result.frame.values("TA"),
        Some(vec![None, Some(10.0), Some(20.0), None])
    );
    assert_eq!(result.report.variable("TA").unwrap().counts.range, 2);
}

#[test]
fn dependencies_propagate_missingness() {
    let rules = parse_rules(
        "A:\n  inputFileName: a\n  variableName: A\n  minMax: [0, 100]\n  dependent: [B]\n\
         B:\n  inputFileName: b\n  variableName: B\n  minMax: [0, 100]\n",
        RuleFormat::Yaml,
    )
    .unwrap()
    .rules;
    let dataset = frame(vec![
        ("a", vec![Some(10.0), Some(20.0), Some(30.0)]),
        ("b", vec![Some(1.0), None, Some(3.0)]),
    ]);
    let result = screen_dataset(&dataset, &rules, &ScreeningOptions::default()).unwrap();
    assert_eq!(result.frame.values("A"), Some(vec![Some(10.0), None, Some(30.0)]));
    assert_eq!(
        result.provenance["A"],
        vec![None, Some(ExclusionReason::Dependency), None]
    );
    assert_eq!(
        result.provenance["B"],
        vec![None, Some(ExclusionReason::Missing), None]
    );
}

#[test]
fn dependency_mask_uses_range_screened_values() {
    let mut rules = RuleSet::new();
    rules
        .insert(ScreeningRule::new("H", "H", "H", range(-200.0, 800.0)).with_dependencies(["USTAR"]))
        .unwrap();
    rules
        .insert(ScreeningRule::new("USTAR", "USTAR", "USTAR", range(0.0, 5.0)))
        .unwrap();
    let dataset = frame(vec![
        ("H", vec![Some(50.0), Some(60.0), Some(70.0)]),
        ("USTAR", vec![Some(0.3), Some(-1.0), Some(0.4)]),
    ]);
    let result = screen_dataset(&dataset, &rules, &ScreeningOptions::default()).unwrap();
    assert_eq!(result.frame.column_names(), vec!["H", "USTAR"]);
    assert_eq!(result.frame.values("H"), Some(vec![Some(50.0), None, Some(70.0)]));

    let screened: ScreenedColumns = [
        ("H".to_string(), vec![Some(50.0), Some(60.0), Some(70.0)]),
        ("USTAR".to_string(), vec![Some(0.3), None, Some(0.4)]),
    ]
    .into_iter()
    .collect();
    let propagated = propagate_dependencies(&screened, &rules);
    assert_eq!(
        propagated.columns["H"],
        result.frame.values("H").unwrap()
    );
}

#[test]
fn date_exclusions_remove_marked_rows() {
    let values = [Some(1.0), Some(2.0), Some(3.0)];
    let screened =
        quality_screening(&values, &range(0.0, 10.0), Some(&[false, true, false]), None, None)
            .unwrap();
    assert_eq!(screened, vec![Some(1.0), None, Some(3.0)]);

    let mut rules = RuleSet::new();
    let exclusion: DateRange = "2024-06-01 00:30".parse().unwrap();
    rules
        .insert(ScreeningRule::new("X", "x", "X", range(0.0, 10.0)).with_exclusions(vec![exclusion]))
        .unwrap();
    rules
        .insert(ScreeningRule::new("Y", "y", "Y", range(0.0, 10.0)))
        .unwrap();
    let dataset = frame(vec![
        ("x", values.to_vec()),
        ("y", values.to_vec()),
    ]);
    let global: DateRange = "2024-06-01 01:00/2024-06-01 02:00".parse().unwrap();
    let options = ScreeningOptions {
        exclusions: vec![global],
        ..ScreeningOptions::default()
    };
    let result = screen_dataset(&dataset, &rules, &options).unwrap();
    assert_eq!(result.frame.values("X"), Some(vec![Some(1.0), None, None]));
    assert_eq!(result.frame.values("Y"), Some(vec![Some(1.0), Some(2.0), None]));
    assert_eq!(result.report.variable("X").unwrap().counts.date_exclusion, 2);
}

#[test]
fn quality_flag_two_is_removed() {
    let screened = quality_screening(
        &[Some(5.0), Some(6.0), Some(7.0)],
        &range(0.0, 10.0),
        None,
        None,
        Some(&[Some(0.0), Some(2.0), Some(1.0)]),
    )
    .unwrap();
    assert_eq!(screened, vec![Some(5.0), None, Some(7.0)]);

    let rules = parse_rules(
        "H:\n  inputFileName: H\n  variableName: H\n  minMax: [-200, 800]\n  qcFlag: qc_H\n\
         LE:\n  inputFileName: LE\n  variableName: LE\n  minMax: [-200, 1000]\n  qcFlag: qc_LE\n",
        RuleFormat::Yaml,
    )
    .unwrap()
    .rules;
    let dataset = frame(vec![
        ("H", vec![Some(5.0), Some(6.0), Some(7.0)]),
        ("LE", vec![Some(5.0), Some(6.0), Some(7.0)]),
        ("qc_H", vec![Some(0.0), Some(2.0), None]),
    ]);
    let result = screen_dataset(&dataset, &rules, &ScreeningOptions::default()).unwrap();
    assert_eq!(result.frame.values("H"), Some(vec![Some(5.0), None, Some(7.0)]));
    assert_eq!(result.frame.values("LE"), Some(vec![Some(5.0), Some(6.0), Some(7.0)]));
    let flag_issues: Vec<_> = result
        .report
        .issues_of(IssueKind::QualityFlagUnavailable)
        .collect();
    assert_eq!(flag_issues.len(), 1);
    assert_eq!(flag_issues[0].subject, "qc_LE");
    assert!(!result.frame.has_column("qc_H"));
}

#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn missing_input_column_is_reported_once() {
    let rules = parse_rules(
        "[TA]\ninputFileName = AirTC\nvariableName = TA\nminMax = [-40, 50]\n\
         [TS]\ninputFileName = Tsoil\nvariableName = TS\nminMax = [-40, 50]\n",
        RuleFormat::Ini,
    )
    .unwrap()
    .rules;
    let dataset = frame(vec![("AirTC", vec![Some(12.0)])]);

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, || {
        screen_dataset(&dataset, &rules, &ScreeningOptions::default()).unwrap()
    });

    assert_eq!(result.frame.column_names(), vec!["TA"]);
    assert!(!result.frame.has_column("TS"));
    assert_eq!(result.report.unavailable(), vec!["Tsoil"]);
    assert!(result.report.failures().is_empty());

    let text = logs.text();
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("variable unavailable"))
        .collect();
    assert_eq!(lines.len(), 1, "{text}");
    assert!(lines[0].contains("Tsoil"));
}

#[test]
fn unresolved_dependency_is_warned_once_per_path() {
    let rules = parse_rules(
        "[H]\ninputFileName = H\nvariableName = H\nminMax = [-200, 800]\ndependent = [GHOST]\n",
        RuleFormat::Ini,
    )
    .unwrap()
    .rules;
    let dataset = frame(vec![("H", vec![Some(10.0), Some(20.0)])]);
    let screened: ScreenedColumns = [("H".to_string(), vec![Some(10.0), Some(20.0)])]
        .into_iter()
        .collect();

    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let (result, propagated) = tracing::subscriber::with_default(subscriber, || {
        (
            screen_dataset(&dataset, &rules, &ScreeningOptions::default()).unwrap(),
            propagate_dependencies(&screened, &rules),
        )
    });

    assert_eq!(result.frame.values("H"), Some(vec![Some(10.0), Some(20.0)]));
    let issues: Vec<_> = result
        .report
        .issues_of(IssueKind::DependencyUnresolved)
        .collect();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].subject, "GHOST");
    assert_eq!(
        propagated.unresolved,
        vec![("H".to_string(), "GHOST".to_string())]
    );

    let text = logs.text();
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("dependency does not name a screened variable"))
        .collect();
    assert_eq!(lines.len(), 2, "{text}");
    assert!(lines.iter().all(|line| line.contains("GHOST")));
}

#[test]
fn disabled_filters_leave_values_untouched() {
    let values = [Some(1.0), None, Some(3.5)];
    let screened = quality_screening(&values, &range(-100.0, 100.0), None, None, None).unwrap();
    assert_eq!(screened, values.to_vec());
}
