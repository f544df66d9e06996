//! CLI argument definitions for flux-qc.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use flux_ingest::DEFAULT_RADIUS_KM;
use flux_model::DateRange;
use flux_screen::MAUDER_FOKEN_REJECT;

#[derive(Parser)]
#[command(
    name = "flux-qc",
    version,
    about = "Quality-control screening for eddy-covariance flux data",
    long_about = "Screen eddy-covariance flux and biomet data against per-variable rules.\n\n\
                  Reads EddyPro full output and Campbell TOA5 biomet files, applies range,\n\
                  date, dependency and Mauder-Foken quality-flag filters, and writes the\n\
                  screened dataset with a JSON report."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Screen a site's flux and biomet data with a rule file.
    Screen(ScreenArgs),

    /// Load a rule file and print its rules and diagnostics.
    Rules(RulesArgs),

    /// List ECCC climate stations near a coordinate.
    Stations(StationsArgs),

    /// Download hourly ECCC station data.
    Met(MetArgs),

    /// Estimate canopy height from an EddyPro full-output file.
    Canopy(CanopyArgs),
}

#[derive(Args)]
pub struct ScreenArgs {
    /// Screening rule file (.ini or .yaml).
    #[arg(long = "rules", value_name = "PATH")]
    pub rules: PathBuf,

    /// EddyPro full-output CSV file.
    #[arg(long = "full-output", value_name = "PATH")]
    pub full_output: Option<PathBuf>,

    /// Campbell TOA5 biomet files, concatenated in the order given.
    #[arg(long = "biomet", value_name = "PATH", num_args = 1..)]
    pub biomet: Vec<PathBuf>,

    /// Output directory for screened.csv and screening_report.json.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Quality-flag value that removes a data point.
    #[arg(long = "flag-code", value_name = "CODE", default_value_t = MAUDER_FOKEN_REJECT)]
    pub flag_code: f64,

    /// Exclude START/END from every variable (repeatable).
    #[arg(long = "exclude", value_name = "START/END")]
    pub exclude: Vec<DateRange>,

    /// Screen and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Exit with status 0 even when rule sections were discarded.
    ///
    /// Variables whose screening failed still produce a non-zero status.
    #[arg(long = "allow-config-errors")]
    pub allow_config_errors: bool,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Screening rule file (.ini or .yaml).
    #[arg(value_name = "PATH")]
    pub rules: PathBuf,
}

#[derive(Args)]
pub struct StationsArgs {
    /// Station catalogue CSV (climate-stations.csv).
    #[arg(long = "catalogue", value_name = "PATH")]
    pub catalogue: PathBuf,

    /// Site longitude in decimal degrees.
    #[arg(long = "lon", allow_hyphen_values = true)]
    pub longitude: f64,

    /// Site latitude in decimal degrees.
    #[arg(long = "lat", allow_hyphen_values = true)]
    pub latitude: f64,

    /// Search radius in kilometres.
    #[arg(long = "radius", value_name = "KM", default_value_t = DEFAULT_RADIUS_KM)]
    pub radius_km: f64,
}

#[derive(Args)]
pub struct MetArgs {
    /// ECCC station identifier.
    #[arg(long = "station", value_name = "ID")]
    pub station_id: u32,

    /// Years to download.
    #[arg(long = "years", value_name = "YEAR", num_args = 1.., required = true)]
    pub years: Vec<i32>,

    /// Months to download (default: all twelve).
    #[arg(
        long = "months",
        value_name = "MONTH",
        num_args = 1..,
        value_parser = clap::value_parser!(u32).range(1..=12)
    )]
    pub months: Vec<u32>,

    /// Output directory for the hourly and half-hourly CSV files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "met")]
    pub output_dir: PathBuf,
}

#[derive(Args)]
pub struct CanopyArgs {
    /// EddyPro full-output CSV file.
    #[arg(long = "full-output", value_name = "PATH")]
    pub full_output: PathBuf,

    /// Output directory for the half-hourly and daily CSV files.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "canopy")]
    pub output_dir: PathBuf,

    /// Measurement height z in metres.
    #[arg(long = "measurement-height", value_name = "M", default_value_t = 7.1)]
    pub measurement_height: f64,

    /// Lower u* bound (exclusive).
    #[arg(long = "ustar-min", default_value_t = 0.2)]
    pub ustar_min: f64,

    /// Upper u* bound (exclusive).
    #[arg(long = "ustar-max", default_value_t = 0.4)]
    pub ustar_max: f64,

    /// Largest |(z-d)/L| treated as neutral.
    #[arg(long = "neutral-limit", default_value_t = 0.1)]
    pub neutral_limit: f64,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
