//! ECCC climate station catalogue and proximity search.

use std::path::Path;

use flux_common::parse_f64;
use tracing::{debug, info};

use crate::error::Result;
use crate::table::{RawTable, TableLayout};

/// Mean Earth diameter used by the haversine distance, in km.
pub const EARTH_DIAMETER_KM: f64 = 12_742.0;

/// Default search radius, in km.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: u32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbyStation {
    pub station: Station,
    pub distance_km: f64,
}

/// Great-circle distance between two points given in decimal degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let p = std::f64::consts::PI / 180.0;
    let hav = 0.5 - ((lat2 - lat1) * p).cos() / 2.0
        + (lat1 * p).cos() * (lat2 * p).cos() * (1.0 - ((lon2 - lon1) * p).cos()) / 2.0;
    EARTH_DIAMETER_KM * hav.clamp(0.0, 1.0).sqrt().asin()
}

/// Reads the station catalogue (`climate-stations.csv`).
///
/// Uses the `x`, `y`, `STN_ID` and `STATION_NAME` columns. Rows without a
/// usable id or coordinates are skipped.
pub fn read_station_catalogue(path: &Path) -> Result<Vec<Station>> {
    let table = RawTable::from_path(path, TableLayout::PLAIN)?;
    let stations = stations_from_table(&table)?;
    info!(path = %path.display(), stations = stations.len(), "read station catalogue");
    Ok(stations)
}

pub(crate) fn stations_from_table(table: &RawTable) -> Result<Vec<Station>> {
    let x = table.require_column("x")?;
    let y = table.require_column("y")?;
    let id = table.require_column("STN_ID")?;
    let name = table.require_column("STATION_NAME")?;

    let mut stations = Vec::with_capacity(table.rows.len());
    for row in 0..table.rows.len() {
        let parsed = (
            parse_station_id(table.cell(row, id)),
            parse_f64(table.cell(row, y)),
            parse_f64(table.cell(row, x)),
        );
        let (Some(id), Some(latitude), Some(longitude)) = parsed else {
            debug!(line = row + 2, "skipping station without id or coordinates");
            continue;
        };
        stations.push(Station {
            id,
            name: table.cell(row, name).to_string(),
            latitude,
            longitude,
        });
    }
    Ok(stations)
}

fn parse_station_id(raw: &str) -> Option<u32> {
    let value = parse_f64(raw)?;
    (value >= 0.0 && value.fract() == 0.0 && value <= f64::from(u32::MAX)).then_some(value as u32)
}

/// Stations strictly closer than `radius_km`, nearest first.
pub fn nearby_stations(
    stations: &[Station],
    longitude: f64,
    latitude: f64,
    radius_km: f64,
) -> Vec<NearbyStation> {
    let mut nearby: Vec<NearbyStation> = stations
        .iter()
        .map(|station| NearbyStation {
            distance_km: haversine_km(latitude, longitude, station.latitude, station.longitude),
            station: station.clone(),
        })
        .filter(|candidate| candidate.distance_km < radius_km)
        .collect();
    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

/// Reads the catalogue and searches it in one step.
pub fn find_nearby_stations(
    catalogue: &Path,
    longitude: f64,
    latitude: f64,
    radius_km: f64,
) -> Result<Vec<NearbyStation>> {
    let stations = read_station_catalogue(catalogue)?;
    let nearby = nearby_stations(&stations, longitude, latitude, radius_km);
    info!(
        longitude,
        latitude,
        radius_km,
        found = nearby.len(),
        "searched for nearby stations"
    );
    Ok(nearby)
}
