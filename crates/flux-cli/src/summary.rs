use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use flux_cli::pipeline::{CanopyOutputs, ScreenOutcome, StationOutputs};
use flux_config::RuleSetLoad;
use flux_ingest::{NearbyStation, StationData};
use flux_model::{IssueSeverity, ScreeningIssue, ScreeningRule, format_timestamp};
use flux_transform::CanopyHeight;

pub fn print_screen_summary(outcome: &ScreenOutcome) {
    let report = &outcome.result.report;
    println!("Rules: {}", outcome.rule_file.display());
    println!("Records: {}", report.records);
    match &outcome.outputs {
        Some(paths) => {
            println!("Screened data: {}", paths.screened_csv.display());
            println!("Report: {}", paths.report_json.display());
        }
        None => println!("Dry run: no files written"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Input"),
        header_cell("Valid"),
        header_cell("Missing"),
        header_cell("Range"),
        header_cell("Date"),
        header_cell("Dependency"),
        header_cell("Flag"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..8 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_valid = 0usize;
    let mut total_removed = 0usize;
    for summary in &report.variables {
        let counts = summary.counts;
        total_valid += summary.valid;
        total_removed += counts.removed();
        table.add_row(vec![
            Cell::new(&summary.output_name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            dim_cell(&summary.input_column),
            Cell::new(summary.valid),
            count_cell(counts.missing, Color::DarkGrey),
            count_cell(counts.range, Color::Yellow),
            count_cell(counts.date_exclusion, Color::Yellow),
            count_cell(counts.dependency, Color::Yellow),
            count_cell(counts.quality_flag, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(format!("{} variables", report.variables.len())),
        Cell::new(total_valid).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(format!("{total_removed} removed")).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    print_issue_table(&report.issues);
    print_config_errors(&outcome.load);
}

pub fn print_rule_table(load: &RuleSetLoad) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Input"),
        header_cell("Output"),
        header_cell("Range"),
        header_cell("Depends on"),
        header_cell("Flag"),
        header_cell("Exclusions"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 6, CellAlignment::Right);
    for rule in load.rules.iter() {
        table.add_row(rule_row(rule));
    }
    println!("{table}");
    println!(
        "{} rules loaded, {} sections discarded",
        load.rules.len(),
        load.discarded()
    );
    print_config_errors(load);
}

fn rule_row(rule: &ScreeningRule) -> Vec<Cell> {
    let dependencies = if rule.has_dependencies() {
        Cell::new(rule.dependencies.join(", "))
    } else {
        dim_cell("-")
    };
    let flag = match &rule.quality_flag {
        Some(column) => Cell::new(column),
        None => dim_cell("-"),
    };
    let exclusions = if rule.exclusions.is_empty() {
        dim_cell(0)
    } else {
        Cell::new(rule.exclusions.len())
    };
    vec![
        Cell::new(&rule.section)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(&rule.input_column),
        Cell::new(&rule.output_name),
        Cell::new(rule.range),
        dependencies,
        flag,
        exclusions,
    ]
}

pub fn print_stations(stations: &[NearbyStation], radius_km: f64) {
    if stations.is_empty() {
        println!("No stations within {radius_km} km");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Station ID"),
        header_cell("Name"),
        header_cell("Latitude"),
        header_cell("Longitude"),
        header_cell("Distance (km)"),
    ]);
    apply_list_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for nearby in stations {
        table.add_row(vec![
            Cell::new(nearby.station.id).add_attribute(Attribute::Bold),
            Cell::new(&nearby.station.name),
            dim_cell(format!("{:.4}", nearby.station.latitude)),
            dim_cell(format!("{:.4}", nearby.station.longitude)),
            Cell::new(format!("{:.1}", nearby.distance_km)),
        ]);
    }
    println!("{table}");
}

pub fn print_station_download(station_id: u32, data: &StationData, outputs: &StationOutputs) {
    println!("Station: {station_id}");
    println!(
        "Months: {} retrieved, {} skipped",
        data.months_retrieved, data.months_skipped
    );
    if let (Some(start), Some(end)) = (data.hourly.start(), data.hourly.end()) {
        println!(
            "Period: {} to {}",
            format_timestamp(start),
            format_timestamp(end)
        );
    }
    println!("Variables: {}", data.hourly.column_names().join(", "));
    println!("Hourly: {}", outputs.hourly_csv.display());
    println!("Half-hourly: {}", outputs.half_hourly_csv.display());
}

pub fn print_canopy(estimate: &CanopyHeight, outputs: &CanopyOutputs) {
    println!(
        "Canopy height estimated for {} of {} half-hours ({} days)",
        estimate.valid_count(),
        estimate.half_hourly.height(),
        estimate.daily.height()
    );
    println!("Half-hourly: {}", outputs.half_hourly_csv.display());
    println!("Daily: {}", outputs.daily_csv.display());
}

fn print_issue_table(issues: &[ScreeningIssue]) {
    if issues.is_empty() {
        return;
    }
    let mut ordered: Vec<&ScreeningIssue> = issues.iter().collect();
    ordered.sort_by_key(|issue| severity_rank(issue.severity));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Section"),
        header_cell("Subject"),
        header_cell("Message"),
    ]);
    apply_list_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in ordered {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(&issue.section),
            Cell::new(&issue.subject),
            Cell::new(&issue.message),
        ]);
    }
    println!();
    println!("Issues:");
    println!("{table}");
}

fn print_config_errors(load: &RuleSetLoad) {
    if load.is_clean() {
        return;
    }
    eprintln!("Rule file diagnostics:");
    for error in &load.errors {
        eprintln!("- {error}");
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
}

fn apply_list_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: IssueSeverity) -> Cell {
    match severity {
        IssueSeverity::Error => Cell::new("ERROR")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        IssueSeverity::Warning => Cell::new("WARN").fg(Color::Yellow),
    }
}

fn severity_rank(severity: IssueSeverity) -> u8 {
    match severity {
        IssueSeverity::Error => 0,
        IssueSeverity::Warning => 1,
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
