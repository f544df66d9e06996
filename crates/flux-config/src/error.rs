#![deny(unsafe_code)]

use std::path::PathBuf;

use flux_model::ModelError;

/// A problem with a single rule section.
///
/// The section is discarded and loading continues with the next one.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("[{section}] missing required key '{key}'")]
    MissingKey { section: String, key: &'static str },

    #[error("[{section}] invalid range '{value}': {reason}")]
    InvalidRange {
        section: String,
        value: String,
        reason: String,
    },

    #[error("[{section}] invalid value for '{key}': {reason}")]
    InvalidValue {
        section: String,
        key: &'static str,
        reason: String,
    },

    #[error("[{section}] invalid date exclusion: {source}")]
    InvalidExclusion {
        section: String,
        #[source]
        source: ModelError,
    },

    #[error("[{section}] malformed section: {reason}")]
    MalformedSection { section: String, reason: String },

    #[error("[{section}] rejected: {source}")]
    Rejected {
        section: String,
        #[source]
        source: ModelError,
    },

    #[error("dependency cycle between {}", .members.join(", "))]
    DependencyCycle { members: Vec<String> },
}

impl ConfigError {
    /// Section the error belongs to, if it concerns a single section.
    pub fn section(&self) -> Option<&str> {
        match self {
            Self::MissingKey { section, .. }
            | Self::InvalidRange { section, .. }
            | Self::InvalidValue { section, .. }
            | Self::InvalidExclusion { section, .. }
            | Self::MalformedSection { section, .. }
            | Self::Rejected { section, .. } => Some(section),
            Self::DependencyCycle { .. } => None,
        }
    }

    /// True when the error caused a rule to be dropped.
    pub fn discards_rule(&self) -> bool {
        !matches!(self, Self::DependencyCycle { .. })
    }
}

/// Failure to read or parse a rule file as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported rule file extension: {path} (expected .ini, .cfg, .yaml or .yml)")]
    UnsupportedFormat { path: PathBuf },

    #[error("failed to parse INI rules: {message}")]
    Ini { message: String },

    #[error("failed to parse YAML rules: {source}")]
    Yaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid rule file layout: {message}")]
    Layout { message: String },
}

impl ConfigLoadError {
    pub(crate) fn layout(message: impl Into<String>) -> Self {
        Self::Layout {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigLoadError>;
