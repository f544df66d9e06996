//! Hourly station data from the ECCC bulk download service.

use std::time::Duration;

use flux_common::parse_f64;
use flux_transform::{Cadence, Records, TimeFrame};
use tracing::{debug, info, warn};

use crate::error::{IngestError, Result};
use crate::table::{RawTable, TableLayout};

const BULK_DATA_URL: &str = "https://climate.weather.gc.ca/climate_data/bulk_data_e.html";

/// Per-request timeout of the bulk download service.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENT_VALUE: &str = concat!("flux-qc/", env!("CARGO_PKG_VERSION"));

/// Index column of the bulk CSV.
pub const STATION_TIMESTAMP: &str = "Date/Time (LST)";

/// Descriptive columns dropped from the bulk CSV.
pub const STATION_METADATA: [&str; 8] = [
    "Longitude (x)",
    "Latitude (y)",
    "Station Name",
    "Climate ID",
    "Year",
    "Month",
    "Day",
    "Time (LST)",
];

/// One month of hourly data for one station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRequest {
    pub station_id: u32,
    pub year: i32,
    pub month: u32,
}

impl MonthRequest {
    pub fn url(&self) -> String {
        format!(
            "{BULK_DATA_URL}?format=csv&stationID={}&Year={}&Month={}&Day=14&timeframe=1&submit=%20Download+Data",
            self.station_id, self.year, self.month
        )
    }
}

/// What happened to one month request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthOutcome {
    Retrieved { rows: usize },
    Skipped { reason: String },
}

/// Something that can deliver the bulk CSV text of one month.
pub trait MonthSource {
    fn fetch_month(&self, request: &MonthRequest) -> std::result::Result<String, String>;
}

/// Blocking HTTP client for the bulk download service.
#[derive(Debug, Clone)]
pub struct EcccClient {
    client: reqwest::blocking::Client,
}

impl EcccClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT_VALUE)
            .build()
            .map_err(|error| IngestError::HttpClient(error.to_string()))?;
        Ok(Self { client })
    }
}

impl MonthSource for EcccClient {
    fn fetch_month(&self, request: &MonthRequest) -> std::result::Result<String, String> {
        let url = request.url();
        debug!(%url, "requesting station data");
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|error| error.to_string())?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP {status}"));
        }
        response.text().map_err(|error| error.to_string())
    }
}

/// Station data on the hourly and half-hourly grids.
#[derive(Debug, Clone)]
pub struct StationData {
    pub hourly: TimeFrame,
    /// Hourly data re-gridded to 30 minutes, time-interpolated and filled
    /// at the edges.
    pub half_hourly: TimeFrame,
    pub months_retrieved: usize,
    pub months_skipped: usize,
}

/// Downloads every `(year, month)` combination for a station.
///
/// Failed or unparsable months are logged and skipped; the months that
/// arrived are concatenated. `on_month` is called once per request.
pub fn fetch_station_data<S, F>(
    source: &S,
    station_id: u32,
    years: &[i32],
    months: &[u32],
    mut on_month: F,
) -> Result<StationData>
where
    S: MonthSource + ?Sized,
    F: FnMut(&MonthRequest, &MonthOutcome),
{
    let mut records = Records::default();
    let mut retrieved = 0usize;
    let mut skipped = 0usize;
    for &year in years {
        for &month in months {
            let request = MonthRequest {
                station_id,
                year,
                month,
            };
            let parsed = source
                .fetch_month(&request)
                .and_then(|text| parse_station_csv(&text, &request.url()).map_err(|e| e.to_string()));
            let outcome = match parsed {
                Ok(month_records) => {
                    let rows = month_records.len();
                    records.append(month_records);
                    retrieved += 1;
                    MonthOutcome::Retrieved { rows }
                }
                Err(reason) => {
                    warn!(station_id, year, month, %reason, "skipping station month");
                    skipped += 1;
                    MonthOutcome::Skipped { reason }
                }
            };
            on_month(&request, &outcome);
        }
    }
    if records.is_empty() {
        return Err(IngestError::NoStationData { station_id });
    }

    let dropped = records.drop_empty_columns();
    if !dropped.is_empty() {
        debug!(columns = ?dropped, "dropping station columns without data");
    }
    let hourly = records.resample(Cadence::HOURLY)?;
    let half_hourly = hourly
        .resample(Cadence::HALF_HOURLY)?
        .interpolate_time()?
        .fill_edges()?;
    info!(
        station_id,
        months = retrieved,
        skipped,
        hourly_records = hourly.height(),
        variables = hourly.width(),
        "retrieved station data"
    );
    Ok(StationData {
        hourly,
        half_hourly,
        months_retrieved: retrieved,
        months_skipped: skipped,
    })
}

/// Parses one bulk CSV document.
///
/// Flag columns and descriptive columns are dropped; every other cell is
/// coerced to a number, with anything non-numeric treated as missing.
pub fn parse_station_csv(text: &str, source_name: &str) -> Result<Records> {
    let table = RawTable::from_reader(text.as_bytes(), source_name, TableLayout::PLAIN)?;
    let timestamp = table.require_column(STATION_TIMESTAMP)?;
    let index = table.timestamps(&[timestamp], 2)?;

    let mut columns: Vec<(String, Vec<Option<f64>>)> = Vec::new();
    for (position, name) in table.headers.iter().enumerate() {
        if position == timestamp
            || name.is_empty()
            || name.contains("Flag")
            || STATION_METADATA.contains(&name.as_str())
            || columns.iter().any(|(existing, _)| existing == name)
        {
            continue;
        }
        let values = (0..table.rows.len())
            .map(|row| parse_f64(table.cell(row, position)))
            .collect();
        columns.push((name.clone(), values));
    }
    Ok(Records::new(index, columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONTH: &str = "\u{feff}\"Longitude (x)\",\"Latitude (y)\",\"Station Name\",\"Climate ID\",\"Date/Time (LST)\",\"Year\",\"Month\",\"Day\",\"Time (LST)\",\"Temp (°C)\",\"Temp Flag\",\"Weather\"
\"-73.75\",\"45.47\",\"MONTREAL INTL A\",\"7025251\",\"2024-06-01 00:00\",\"2024\",\"06\",\"01\",\"00:00\",\"14.2\",\"\",\"NA\"
\"-73.75\",\"45.47\",\"MONTREAL INTL A\",\"7025251\",\"2024-06-01 01:00\",\"2024\",\"06\",\"01\",\"01:00\",\"\",\"M\",\"Clear\"
";

    #[test]
    fn url_targets_hourly_bulk_csv() {
        let request = MonthRequest {
            station_id: 51157,
            year: 2024,
            month: 6,
        };
        assert_eq!(
            request.url(),
            "https://climate.weather.gc.ca/climate_data/bulk_data_e.html?format=csv&stationID=51157&Year=2024&Month=6&Day=14&timeframe=1&submit=%20Download+Data"
        );
    }

    #[test]
    fn drops_flags_and_metadata() {
        let records = parse_station_csv(MONTH, "june.csv").unwrap();
        assert_eq!(records.column_names(), vec!["Temp (°C)", "Weather"]);
        assert_eq!(records.values("Temp (°C)"), Some(&[Some(14.2), None][..]));
        assert_eq!(records.values("Weather"), Some(&[None, None][..]));
    }
}
