//! CLI library components for flux-qc.

pub mod logging;
pub mod pipeline;
