use std::path::Path;

use flux_model::RuleSet;
use tracing::{info, warn};

use crate::error::{ConfigError, ConfigLoadError, Result};
use crate::schema::SectionResult;
use crate::{ini_source, yaml_source};

/// Rule file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleFormat {
    Ini,
    Yaml,
}

impl RuleFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "ini" | "cfg" | "conf" => Some(Self::Ini),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A loaded rule set together with the sections that were rejected.
#[derive(Debug, Clone, Default)]
pub struct RuleSetLoad {
    pub rules: RuleSet,
    pub errors: Vec<ConfigError>,
}

impl RuleSetLoad {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of sections dropped because of an error.
    pub fn discarded(&self) -> usize {
        self.errors
            .iter()
            .filter(|error| error.discards_rule())
            .count()
    }
}

/// Loads a rule file, choosing the syntax from its extension.
pub fn load_rules(path: &Path) -> Result<RuleSetLoad> {
    let format =
        RuleFormat::from_path(path).ok_or_else(|| ConfigLoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        })?;
    let text = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let load = parse_rules(&text, format)?;
    info!(
        path = %path.display(),
        rules = load.rules.len(),
        errors = load.errors.len(),
        "loaded screening rules"
    );
    Ok(load)
}

/// Parses rule text in the given syntax.
///
/// Only a syntactically broken document is an `Err`; malformed sections are
/// collected in [`RuleSetLoad::errors`] and the remaining rules are kept.
pub fn parse_rules(text: &str, format: RuleFormat) -> Result<RuleSetLoad> {
    let sections = match format {
        RuleFormat::Ini => ini_source::read_sections(text)?,
        RuleFormat::Yaml => yaml_source::read_sections(text)?,
    };
    Ok(build_rule_set(&sections))
}

pub(crate) fn build_rule_set(sections: &[SectionResult]) -> RuleSetLoad {
    let mut load = RuleSetLoad::default();
    for section in sections {
        let section = match section {
            Ok(section) => section,
            Err(error) => {
                warn!(%error, "discarding screening rule");
                load.errors.push(error.clone());
                continue;
            }
        };
        let rule = match section.to_rule() {
            Ok(rule) => rule,
            Err(error) => {
                warn!(section = %section.name, %error, "discarding screening rule");
                load.errors.push(error);
                continue;
            }
        };
        if let Err(source) = load.rules.insert(rule) {
            let error = ConfigError::Rejected {
                section: section.name.clone(),
                source,
            };
            warn!(section = %section.name, %error, "discarding screening rule");
            load.errors.push(error);
        }
    }
    for members in load.rules.dependency_cycles() {
        let error = ConfigError::DependencyCycle { members };
        warn!(%error, "dependencies are only followed one hop");
        load.errors.push(error);
    }
    load
}
