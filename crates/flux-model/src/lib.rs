pub mod error;
pub mod rule;
pub mod screening;
pub mod timestamp;

pub use error::{ModelError, Result};
pub use rule::{DateRange, RuleSet, ScreeningRule, ValueRange};
pub use screening::{
    ExclusionReason, IssueKind, IssueSeverity, ReasonCounts, ScreeningIssue, ScreeningReport,
    VariableSummary,
};
pub use timestamp::{TIMESTAMP_FORMAT, format_timestamp, parse_period_end, parse_timestamp};
