//! Site processing pipeline with explicit stages.
//!
//! The `screen` command runs these stages in order:
//! 1. **Rules**: load and validate the screening rule file
//! 2. **Ingest**: read EddyPro full output and biomet files, join them on
//!    the half-hourly grid
//! 3. **Screen**: apply range, date, dependency and quality-flag filters
//! 4. **Output**: write the screened CSV and the JSON report
//!
//! Each stage takes the output of the previous stage and returns typed results.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use flux_config::{RuleSetLoad, load_rules};
use flux_ingest::{
    MonthOutcome, MonthRequest, MonthSource, NearbyStation, StationData, fetch_station_data,
    find_nearby_stations, read_biomet, read_full_output,
};
use flux_output::{OutputPaths, ReportDocument, write_frame_csv, write_report_json};
use flux_screen::{ScreeningEngine, ScreeningOptions, ScreeningResult};
use flux_transform::{CanopyHeight, CanopyHeightParams, TimeFrame, estimate_canopy_height};

/// Suffix given to biomet columns that collide with full-output columns.
pub const BIOMET_SUFFIX: &str = "_biomet";

/// Input files of one site.
#[derive(Debug, Clone, Default)]
pub struct SiteInputs {
    pub full_output: Option<PathBuf>,
    pub biomet: Vec<PathBuf>,
}

// ============================================================================
// Stage 1: Rules
// ============================================================================

/// Loads the rule file and logs every discarded section.
pub fn load_rule_file(path: &Path) -> Result<RuleSetLoad> {
    let load = load_rules(path).with_context(|| format!("load rules {}", path.display()))?;
    if load.rules.is_empty() {
        warn!(path = %path.display(), "rule file defines no usable rules");
    }
    Ok(load)
}

// ============================================================================
// Stage 2: Ingest
// ============================================================================

/// Reads the site files into one frame.
///
/// With both sources present the biomet frame is outer-joined onto the
/// full output; colliding biomet columns get [`BIOMET_SUFFIX`].
pub fn load_dataset(inputs: &SiteInputs) -> Result<TimeFrame> {
    let full_output = match &inputs.full_output {
        Some(path) => Some(
            read_full_output(path)
                .with_context(|| format!("read full output {}", path.display()))?
                .frame,
        ),
        None => None,
    };
    let biomet = if inputs.biomet.is_empty() {
        None
    } else {
        Some(read_biomet(&inputs.biomet).context("read biomet files")?.frame)
    };

    match (full_output, biomet) {
        (Some(fluxes), Some(biomet)) => fluxes
            .join(&biomet, BIOMET_SUFFIX)
            .context("join full output with biomet"),
        (Some(frame), None) | (None, Some(frame)) => Ok(frame),
        (None, None) => bail!("no input files: pass --full-output and/or --biomet"),
    }
}

// ============================================================================
// Stage 3 + 4: Screen and write
// ============================================================================

/// Everything the `screen` command produced.
#[derive(Debug)]
pub struct ScreenOutcome {
    pub rule_file: PathBuf,
    pub load: RuleSetLoad,
    pub result: ScreeningResult,
    /// `None` on a dry run.
    pub outputs: Option<OutputPaths>,
}

impl ScreenOutcome {
    pub fn config_error_count(&self) -> usize {
        self.load.errors.len()
    }

    /// True when the run should end with a non-zero exit code.
    ///
    /// Rule-file diagnostics can be tolerated; screening failures cannot.
    pub fn failed(&self, allow_config_errors: bool) -> bool {
        self.result.report.has_errors() || (!allow_config_errors && !self.load.is_clean())
    }
}

/// Settings of one `screen` run.
#[derive(Debug, Clone)]
pub struct ScreenRequest {
    pub rule_file: PathBuf,
    pub inputs: SiteInputs,
    pub output_dir: PathBuf,
    pub options: ScreeningOptions,
    pub dry_run: bool,
}

/// Loads, screens and writes one site.
pub fn run_screen(request: &ScreenRequest) -> Result<ScreenOutcome> {
    let span = info_span!("screen_site", rules = %request.rule_file.display());
    let _guard = span.enter();
    let started = Instant::now();

    let load = load_rule_file(&request.rule_file)?;
    let dataset = load_dataset(&request.inputs)?;
    info!(
        records = dataset.height(),
        columns = dataset.width(),
        cadence = %dataset.cadence(),
        "dataset ready"
    );

    let engine = ScreeningEngine::new(&load.rules, request.options.clone());
    let result = engine.screen(&dataset).context("screen dataset")?;

    let outputs = if request.dry_run {
        None
    } else {
        Some(write_screen_outputs(request, &load, &result)?)
    };

    info!(
        variables = result.report.variables.len(),
        issues = result.report.issues.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "screening finished"
    );
    Ok(ScreenOutcome {
        rule_file: request.rule_file.clone(),
        load,
        result,
        outputs,
    })
}

fn write_screen_outputs(
    request: &ScreenRequest,
    load: &RuleSetLoad,
    result: &ScreeningResult,
) -> Result<OutputPaths> {
    std::fs::create_dir_all(&request.output_dir)
        .with_context(|| format!("create {}", request.output_dir.display()))?;
    let paths = OutputPaths::in_dir(&request.output_dir);
    write_frame_csv(&result.frame, &paths.screened_csv)
        .with_context(|| format!("write {}", paths.screened_csv.display()))?;
    let document = ReportDocument::new(&result.report)
        .with_rule_file(&request.rule_file)
        .with_config_errors(&load.errors);
    write_report_json(&document, &paths.report_json)
        .with_context(|| format!("write {}", paths.report_json.display()))?;
    Ok(paths)
}

// ============================================================================
// Station data
// ============================================================================

pub fn search_stations(
    catalogue: &Path,
    longitude: f64,
    latitude: f64,
    radius_km: f64,
) -> Result<Vec<NearbyStation>> {
    find_nearby_stations(catalogue, longitude, latitude, radius_km)
        .with_context(|| format!("search station catalogue {}", catalogue.display()))
}

/// Files written by the `met` command.
#[derive(Debug, Clone)]
pub struct StationOutputs {
    pub hourly_csv: PathBuf,
    pub half_hourly_csv: PathBuf,
}

impl StationOutputs {
    pub fn in_dir(dir: &Path, station_id: u32) -> Self {
        Self {
            hourly_csv: dir.join(format!("station_{station_id}_hourly.csv")),
            half_hourly_csv: dir.join(format!("station_{station_id}_30min.csv")),
        }
    }
}

/// Downloads station data and writes both grids.
pub fn run_station_download<S, F>(
    source: &S,
    station_id: u32,
    years: &[i32],
    months: &[u32],
    output_dir: &Path,
    on_month: F,
) -> Result<(StationData, StationOutputs)>
where
    S: MonthSource + ?Sized,
    F: FnMut(&MonthRequest, &MonthOutcome),
{
    let data = fetch_station_data(source, station_id, years, months, on_month)
        .with_context(|| format!("download station {station_id}"))?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let outputs = StationOutputs::in_dir(output_dir, station_id);
    write_frame_csv(&data.hourly, &outputs.hourly_csv)
        .with_context(|| format!("write {}", outputs.hourly_csv.display()))?;
    write_frame_csv(&data.half_hourly, &outputs.half_hourly_csv)
        .with_context(|| format!("write {}", outputs.half_hourly_csv.display()))?;
    Ok((data, outputs))
}

// ============================================================================
// Canopy height
// ============================================================================

/// Files written by the `canopy` command.
#[derive(Debug, Clone)]
pub struct CanopyOutputs {
    pub half_hourly_csv: PathBuf,
    pub daily_csv: PathBuf,
}

impl CanopyOutputs {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            half_hourly_csv: dir.join("canopy_height_30min.csv"),
            daily_csv: dir.join("canopy_height_daily.csv"),
        }
    }
}

/// Estimates canopy height from a full-output file and writes both series.
pub fn run_canopy(
    full_output: &Path,
    params: &CanopyHeightParams,
    output_dir: &Path,
) -> Result<(CanopyHeight, CanopyOutputs)> {
    let frame = read_full_output(full_output)
        .with_context(|| format!("read full output {}", full_output.display()))?
        .frame;
    let estimate = estimate_canopy_height(&frame, params).context("estimate canopy height")?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;
    let outputs = CanopyOutputs::in_dir(output_dir);
    write_frame_csv(&estimate.half_hourly, &outputs.half_hourly_csv)
        .with_context(|| format!("write {}", outputs.half_hourly_csv.display()))?;
    write_frame_csv(&estimate.daily, &outputs.daily_csv)
        .with_context(|| format!("write {}", outputs.daily_csv.display()))?;
    Ok((estimate, outputs))
}
