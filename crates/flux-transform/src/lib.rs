//! Time-indexed flux datasets.
//!
//! - **cadence**: fixed sampling intervals and bucket flooring
//! - **records**: unaligned rows as read from source files
//! - **frame**: the regular [`TimeFrame`] dataset
//! - **fill**: time interpolation and edge filling
//! - **canopy**: canopy height from anemometer statistics

pub mod cadence;
pub mod canopy;
pub mod error;
pub mod fill;
pub mod frame;
pub mod records;

pub use cadence::Cadence;
pub use canopy::{CanopyHeight, CanopyHeightParams, estimate_canopy_height};
pub use error::{Result, TransformError};
pub use fill::{backward_fill, forward_fill, interpolate_series};
pub use frame::TimeFrame;
pub use records::Records;
