//! flux-qc command-line interface.

use clap::{ColorChoice, Parser};
use flux_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{run_canopy, run_met, run_rules, run_screen, run_stations};
use crate::summary::{
    print_canopy, print_rule_table, print_screen_summary, print_station_download, print_stations,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match cli.command {
        Command::Screen(args) => match run_screen(&args) {
            Ok(outcome) => {
                print_screen_summary(&outcome);
                if outcome.failed(args.allow_config_errors) { 1 } else { 0 }
            }
            Err(error) => report_error(&error),
        },
        Command::Rules(args) => match run_rules(&args) {
            Ok(load) => {
                print_rule_table(&load);
                if load.is_clean() { 0 } else { 1 }
            }
            Err(error) => report_error(&error),
        },
        Command::Stations(args) => match run_stations(&args) {
            Ok(stations) => {
                print_stations(&stations, args.radius_km);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Met(args) => match run_met(&args) {
            Ok((data, outputs)) => {
                print_station_download(args.station_id, &data, &outputs);
                0
            }
            Err(error) => report_error(&error),
        },
        Command::Canopy(args) => match run_canopy(&args) {
            Ok((estimate, outputs)) => {
                print_canopy(&estimate, &outputs);
                0
            }
            Err(error) => report_error(&error),
        },
    };
    std::process::exit(exit_code);
}

fn report_error(error: &anyhow::Error) -> i32 {
    eprintln!("error: {error:#}");
    1
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
