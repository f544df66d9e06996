//! Flux data ingestion.
//!
//! This crate turns the raw files of a flux site into [`TimeFrame`]s on the
//! half-hourly grid:
//!
//! - **eddypro**: EddyPro full-output files
//! - **biomet**: Campbell datalogger (TOA5) biomet files
//! - **stations**: ECCC station catalogue and proximity search
//! - **eccc**: hourly ECCC station data over HTTP
//!
//! [`TimeFrame`]: flux_transform::TimeFrame

pub mod biomet;
pub mod eccc;
pub mod eddypro;
pub mod error;
pub mod stations;
pub mod table;

pub use biomet::{Biomet, read_biomet};
pub use eccc::{
    EcccClient, MonthOutcome, MonthRequest, MonthSource, StationData, fetch_station_data,
    parse_station_csv,
};
pub use eddypro::{FullOutput, Units, read_full_output};
pub use error::{IngestError, Result};
pub use stations::{
    DEFAULT_RADIUS_KM, NearbyStation, Station, find_nearby_stations, haversine_km,
    nearby_stations, read_station_catalogue,
};
pub use table::{RawTable, TableLayout, is_sentinel, parse_measurement};
