//! Tests for rule file loading.

use std::io::Write;
use std::path::Path;

use flux_config::{ConfigError, ConfigLoadError, RuleFormat, load_rules, parse_rules};
use tempfile::Builder;

const BIOMET_INI: &str = "\
[TA_1_1_1]
inputfilename = AirTC_Avg
variablename = TA_1_1_1
minmax = [-40, 50]

[RH_1_1_1]
inputfilename = RH
variablename = RH_1_1_1
minmax = [0, 100, 5]

[SW_IN_1_1_1]
inputfilename = SWin_Avg
variablename = SW_IN_1_1_1
minmax = [-10, 1500]

[PA_1_1_1]
inputfilename = BP_kPa
minmax = [60, 110]
";

const FLUX_YAML: &str = "\
USTAR:
  inputFileName: u*
  variableName: USTAR
  minMax: [0, 5]
H:
  inputFileName: H
  variableName: H
  minMax: '[-200, 800]'
  dependent: [USTAR]
  qcFlag: qc_H
LE:
  inputFileName: LE
  variableName: LE
  minMax: [-200, 1000]
  dependent: ['USTAR', 'H']
  exclude:
    - 2024-06-01 00:00/2024-06-01 06:00
    - 2024-06-10 12:00
";

fn write_rules(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn ini_rules_keep_valid_sections_and_collect_errors() {
    let file = write_rules(".ini", BIOMET_INI);
    let load = load_rules(file.path()).unwrap();

    assert_eq!(load.rules.output_names(), vec!["TA_1_1_1", "SW_IN_1_1_1"]);
    assert_eq!(load.errors.len(), 2);
    assert_eq!(load.discarded(), 2);
    assert!(matches!(
        &load.errors[0],
        ConfigError::InvalidRange { section, .. } if section == "RH_1_1_1"
    ));
    assert_eq!(
        load.errors[1],
        ConfigError::MissingKey {
            section: "PA_1_1_1".to_string(),
            key: "variableName",
        }
    );
    assert_eq!(load.errors[1].section(), Some("PA_1_1_1"));
}

#[test]
fn yaml_rules_carry_dependencies_flags_and_exclusions() {
    let file = write_rules(".yaml", FLUX_YAML);
    let load = load_rules(file.path()).unwrap();
    assert!(load.is_clean(), "{:?}", load.errors);

    let h = load.rules.get("H").unwrap();
    assert_eq!(h.input_column, "H");
    assert_eq!(h.range.min(), -200.0);
    assert_eq!(h.dependencies, vec!["USTAR".to_string()]);
    assert_eq!(h.quality_flag.as_deref(), Some("qc_H"));

    let le = load.rules.get("LE").unwrap();
    assert_eq!(le.dependencies, vec!["USTAR".to_string(), "H".to_string()]);
    assert_eq!(le.exclusions.len(), 2);
    assert_eq!(le.exclusions[1].start, le.exclusions[1].end);

    assert_eq!(load.rules.get("USTAR").unwrap().input_column, "u*");
}

#[test]
fn both_layouts_produce_the_same_rule() {
    let ini = parse_rules(
        "[TA]\ninputFileName = AirTC\nvariableName = TA\nminMax = [-40, 50]\n",
        RuleFormat::Ini,
    )
    .unwrap();
    let yaml = parse_rules(
        "TA:\n  inputfilename: AirTC\n  variablename: TA\n  minmax: [-40, 50]\n",
        RuleFormat::Yaml,
    )
    .unwrap();
    assert_eq!(ini.rules, yaml.rules);
}

#[test]
fn duplicate_output_names_are_rejected() {
    let load = parse_rules(
        "A:\n  inputFileName: a\n  variableName: TA\n  minMax: [0, 1]\n\
         B:\n  inputFileName: b\n  variableName: TA\n  minMax: [0, 1]\n",
        RuleFormat::Yaml,
    )
    .unwrap();
    assert_eq!(load.rules.len(), 1);
    assert!(matches!(&load.errors[0], ConfigError::Rejected { section, .. } if section == "B"));
}

#[test]
fn dependency_cycles_are_reported_but_rules_kept() {
    let load = parse_rules(
        "A:\n  inputFileName: a\n  variableName: A\n  minMax: [0, 1]\n  dependent: [B]\n\
         B:\n  inputFileName: b\n  variableName: B\n  minMax: [0, 1]\n  dependent: [A]\n",
        RuleFormat::Yaml,
    )
    .unwrap();
    assert_eq!(load.rules.len(), 2);
    assert_eq!(load.discarded(), 0);
    assert_eq!(
        load.errors,
        vec![ConfigError::DependencyCycle {
            members: vec!["A".to_string(), "B".to_string()],
        }]
    );
    assert_eq!(
        load.errors[0].to_string(),
        "dependency cycle between A, B"
    );
}

#[test]
fn unreadable_files_are_fatal() {
    assert!(matches!(
        load_rules(Path::new("rules.json")),
        Err(ConfigLoadError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        load_rules(Path::new("/definitely/not/here.ini")),
        Err(ConfigLoadError::Io { .. })
    ));
    assert!(matches!(
        parse_rules("A: [unclosed", RuleFormat::Yaml),
        Err(ConfigLoadError::Yaml { .. })
    ));
}

#[test]
fn null_items_do_not_shrink_a_range() {
    let load = parse_rules(
        "TA:\n  inputFileName: AirTC\n  variableName: TA\n  minMax: [~, -40, 50]\n",
        RuleFormat::Yaml,
    )
    .unwrap();
    assert!(load.rules.is_empty());
    assert_eq!(load.discarded(), 1);
    assert!(matches!(
        &load.errors[0],
        ConfigError::MalformedSection { section, reason }
            if section == "TA" && reason.contains("minMax")
    ));
}

#[test]
fn malformed_yaml_section_keeps_the_rest() {
    let load = parse_rules(
        "TA: [1, 2]\nRH: {inputFileName: RH, variableName: RH, minMax: [0, 100]}\n",
        RuleFormat::Yaml,
    )
    .unwrap();
    assert_eq!(load.rules.output_names(), vec!["RH"]);
    assert_eq!(load.errors.len(), 1);
    assert_eq!(load.errors[0].section(), Some("TA"));
    assert!(load.errors[0].discards_rule());
}
