//! Quality-control screening of flux datasets.
//!
//! Screening a dataset runs, for every rule in configuration order:
//!
//! 1. [`screen_range`] on the rule's input column,
//! 2. date exclusions from the rule and from [`ScreeningOptions`],
//! 3. a non-finite guard,
//! 4. the rule's dependency mask, built from the range-screened values
//!    of the variables it depends on ([`propagate_dependencies`]),
//! 5. the Mauder-Foken quality flag filter.
//!
//! Results are renamed to output names by [`rename_project`]. The first
//! filter that removed a value is kept as its [`ExclusionReason`].
//!
//! [`ExclusionReason`]: flux_model::ExclusionReason

pub mod dependency;
pub mod engine;
pub mod error;
pub mod project;
pub mod quality;
pub mod range;

pub use dependency::{
    DependencyMask, Propagation, ScreenedColumns, dependency_mask, propagate_dependencies,
};
pub use engine::{Provenance, ScreeningEngine, ScreeningResult, screen_dataset};
pub use error::{Result, ScreenError};
pub use project::{Projection, rename_project};
pub use quality::{
    MAUDER_FOKEN_REJECT, ScreenedVariable, ScreeningOptions, date_exclusion_mask,
    quality_screening, screen_variable,
};
pub use range::screen_range;
