use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use flux_cli::pipeline::{
    CanopyOutputs, ScreenOutcome, ScreenRequest, SiteInputs, StationOutputs, load_rule_file,
    run_canopy as run_canopy_pipeline, run_screen as run_screen_pipeline, run_station_download,
    search_stations,
};
use flux_config::RuleSetLoad;
use flux_ingest::{EcccClient, MonthOutcome, NearbyStation, StationData};
use flux_screen::ScreeningOptions;
use flux_transform::{CanopyHeight, CanopyHeightParams};

use crate::cli::{CanopyArgs, MetArgs, RulesArgs, ScreenArgs, StationsArgs};

const ALL_MONTHS: [u32; 12] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12];

pub fn run_screen(args: &ScreenArgs) -> Result<ScreenOutcome> {
    let request = ScreenRequest {
        rule_file: args.rules.clone(),
        inputs: SiteInputs {
            full_output: args.full_output.clone(),
            biomet: args.biomet.clone(),
        },
        output_dir: args.output_dir.clone(),
        options: ScreeningOptions {
            flag_code: args.flag_code,
            exclusions: args.exclude.clone(),
        },
        dry_run: args.dry_run,
    };
    run_screen_pipeline(&request)
}

pub fn run_rules(args: &RulesArgs) -> Result<RuleSetLoad> {
    load_rule_file(&args.rules)
}

pub fn run_stations(args: &StationsArgs) -> Result<Vec<NearbyStation>> {
    search_stations(
        &args.catalogue,
        args.longitude,
        args.latitude,
        args.radius_km,
    )
}

pub fn run_met(args: &MetArgs) -> Result<(StationData, StationOutputs)> {
    let months: &[u32] = if args.months.is_empty() {
        &ALL_MONTHS
    } else {
        &args.months
    };
    let client = EcccClient::new().context("build HTTP client")?;

    let total = (args.years.len() * months.len()) as u64;
    let progress = ProgressBar::new(total);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .context("progress bar template")?
            .progress_chars("##-"),
    );

    let result = run_station_download(
        &client,
        args.station_id,
        &args.years,
        months,
        &args.output_dir,
        |request, outcome| {
            let label = format!("{}-{:02}", request.year, request.month);
            match outcome {
                MonthOutcome::Retrieved { rows } => {
                    progress.set_message(format!("{label}: {rows} rows"));
                }
                MonthOutcome::Skipped { .. } => {
                    progress.set_message(format!("{label}: skipped"));
                }
            }
            progress.inc(1);
        },
    );
    progress.finish_and_clear();
    let (data, outputs) = result?;
    info!(
        station = args.station_id,
        retrieved = data.months_retrieved,
        skipped = data.months_skipped,
        "station download finished"
    );
    Ok((data, outputs))
}

pub fn run_canopy(args: &CanopyArgs) -> Result<(CanopyHeight, CanopyOutputs)> {
    let params = CanopyHeightParams {
        measurement_height: args.measurement_height,
        ustar_min: args.ustar_min,
        ustar_max: args.ustar_max,
        neutral_limit: args.neutral_limit,
        ..CanopyHeightParams::default()
    };
    run_canopy_pipeline(&args.full_output, &params, &args.output_dir)
}
