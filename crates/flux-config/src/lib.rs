//! Screening rule configuration.
//!
//! Rule files come in two layouts that grew up side by side: an INI file
//! read with configparser conventions and a YAML file with camel-cased
//! keys. Both are reduced to the same [`RawSection`] schema and validated
//! eagerly into a [`flux_model::RuleSet`].
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use flux_config::load_rules;
//!
//! let load = load_rules(Path::new("config/biomet.ini"))?;
//! for error in &load.errors {
//!     eprintln!("{error}");
//! }
//! let rules = load.rules;
//! ```

mod error;
mod ini_source;
mod loader;
mod schema;
mod yaml_source;

pub use error::{ConfigError, ConfigLoadError, Result};
pub use loader::{RuleFormat, RuleSetLoad, load_rules, parse_rules};
pub use schema::{RawSection, RawValue, parse_list, parse_range};
