//! JSON screening report.

use std::path::Path;

use flux_model::ScreeningReport;
use serde::Serialize;
use tracing::info;

use crate::error::{OutputError, Result};

/// Screening report together with the rule file diagnostics.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub rule_file: Option<String>,
    pub config_errors: Vec<String>,
    #[serde(flatten)]
    pub report: &'a ScreeningReport,
}

impl<'a> ReportDocument<'a> {
    pub fn new(report: &'a ScreeningReport) -> Self {
        Self {
            rule_file: None,
            config_errors: Vec::new(),
            report,
        }
    }

    #[must_use]
    pub fn with_rule_file(mut self, path: &Path) -> Self {
        self.rule_file = Some(path.display().to_string());
        self
    }

    #[must_use]
    pub fn with_config_errors<I, E>(mut self, errors: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: ToString,
    {
        self.config_errors = errors.into_iter().map(|error| error.to_string()).collect();
        self
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn write_report_json(document: &ReportDocument<'_>, path: &Path) -> Result<()> {
    let json = document.to_json()?;
    std::fs::write(path, json).map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote screening report");
    Ok(())
}
