//! `uidai` - CLI for uidai-analytics
//!
//! This binary loads the configured dataset and prints dashboard views as
//! plain text or JSON.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use uidai_analytics::cli::{Cli, Command, ConfigCommand, TopCommand, ZonesCommand};
use uidai_analytics::detect::LOW_UPDATE_CASES_LABEL;
use uidai_analytics::{init_logging, Column, Config, Dashboard, Filter, Zone};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let mut config = Config::load_from(cli.config.clone()).context("loading configuration")?;
    if let Some(data) = &cli.data {
        config.dataset.path = Some(data.clone());
    }

    // Reject bad filter arguments before touching the dataset
    let filter = cli.command.filter()?;

    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        command => command,
    };

    let dashboard = Dashboard::load(&config)
        .with_context(|| format!("loading dataset {}", config.dataset_path().display()))?;

    match command {
        Command::Kpi(cmd) => handle_kpi(&dashboard, cmd.json),
        Command::Trend(cmd) => handle_trend(&dashboard, cmd.json),
        Command::Intensity(cmd) => handle_intensity(&dashboard, cmd.json),
        Command::Top(cmd) => handle_top(&dashboard, &cmd, &filter),
        Command::Zones(cmd) => handle_zones(&dashboard, &cmd, &filter),
        Command::Gap(cmd) => handle_gap(&dashboard, cmd.json),
        Command::Downtime(cmd) => handle_downtime(&dashboard, cmd.json),
        Command::Report(cmd) => handle_report(&dashboard, cmd.json),
        Command::Filters(cmd) => handle_filters(&dashboard, cmd.json),
        Command::Config(_) => Ok(()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn heading(title: &str) {
    println!("{title}");
    println!("{}", "-".repeat(title.chars().count()));
}

fn handle_kpi(dashboard: &Dashboard, json: bool) -> Result<()> {
    let kpi = dashboard.kpi_totals();
    if json {
        return print_json(&kpi);
    }
    heading("Key Performance Indicators");
    println!("Total Aadhaar updates:  {}", kpi.total_updates);
    println!("Children (5-17):        {}", kpi.children_5_to_17);
    println!("Adults (18+):           {}", kpi.adults_18_plus);
    Ok(())
}

fn handle_trend(dashboard: &Dashboard, json: bool) -> Result<()> {
    let trend = dashboard.daily_trend();
    if json {
        return print_json(&trend);
    }
    heading("Daily Aadhaar Activity Trend");
    if trend.is_empty() {
        println!("No data.");
    }
    for day in &trend {
        println!("{}  {:>12}", day.date, day.total);
    }
    Ok(())
}

fn handle_intensity(dashboard: &Dashboard, json: bool) -> Result<()> {
    let intensity = dashboard.state_intensity();
    if json {
        return print_json(&intensity);
    }
    heading("State-wise Update Intensity");
    if intensity.is_empty() {
        println!("No data.");
        return Ok(());
    }
    let width = intensity
        .iter()
        .map(|s| s.state.chars().count())
        .max()
        .unwrap_or(0)
        .max("state".len());
    println!(
        "{:<width$}  {:>12}  {:>12}  {:>14}",
        "state",
        Column::Age0To5,
        Column::Age5To17,
        Column::Age18Plus
    );
    for row in &intensity {
        println!(
            "{:<width$}  {:>12}  {:>12}  {:>14}",
            row.state, row.age_0_5, row.age_5_17, row.age_18_greater
        );
    }
    Ok(())
}

fn print_ranking(title: &str, states: &[uidai_analytics::StateTotal]) {
    heading(title);
    if states.is_empty() {
        println!("No data for this filter.");
        return;
    }
    let width = states
        .iter()
        .map(|s| s.state.chars().count())
        .max()
        .unwrap_or(0);
    for (rank, entry) in states.iter().enumerate() {
        println!("{:>2}. {:<width$}  {:>12}", rank + 1, entry.state, entry.total);
    }
}

fn handle_top(dashboard: &Dashboard, cmd: &TopCommand, filter: &Filter) -> Result<()> {
    let column = cmd.column;
    let states = dashboard.top_states_by(column, filter);
    if cmd.json {
        return print_json(&states);
    }
    print_ranking(&format!("Top states by {column} ({filter})"), &states);
    Ok(())
}

fn handle_zones(dashboard: &Dashboard, cmd: &ZonesCommand, filter: &Filter) -> Result<()> {
    let rankings: Vec<_> = Zone::ALL
        .into_iter()
        .map(|zone| dashboard.zone_ranking(zone, filter))
        .collect();
    if cmd.json {
        return print_json(&rankings);
    }
    for (i, ranking) in rankings.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_ranking(
            &format!("{} ({filter})", ranking.zone.title()),
            &ranking.states,
        );
    }
    Ok(())
}

fn handle_gap(dashboard: &Dashboard, json: bool) -> Result<()> {
    let cases = dashboard.biometric_gap_summary();
    if json {
        return print_json(&cases);
    }
    heading("Child Biometric Update Gap (5-17)");
    if cases.is_empty() {
        println!("No districts with low biometric update activity.");
        return Ok(());
    }
    println!("{:<24}  {:<24}  {}", "state", "district", LOW_UPDATE_CASES_LABEL);
    for case in &cases {
        println!(
            "{:<24}  {:<24}  {}",
            case.state, case.district, case.low_update_cases
        );
    }
    println!();
    println!("Low biometric update activity detected for children aged 5-17.");
    Ok(())
}

fn handle_downtime(dashboard: &Dashboard, json: bool) -> Result<()> {
    let report = dashboard.downtime_report();
    if json {
        return print_json(&report);
    }
    heading("System Downtime & Anomaly Detection");
    println!("Days:            {}", report.days);
    println!("Mean daily:      {:.1}", report.mean);
    println!("Threshold:       {:.1}", report.threshold);
    println!("Lowest daily:    {}", report.minimum);
    println!();
    if report.anomaly {
        println!("Sudden drop detected: possible server or connectivity issue.");
    } else {
        println!("No anomaly detected.");
    }
    Ok(())
}

fn handle_report(dashboard: &Dashboard, json: bool) -> Result<()> {
    if json {
        return print_json(&dashboard.report());
    }
    let load = dashboard.dataset().report();
    println!(
        "Loaded {} rows ({} dropped for unparseable dates, {} cells counted as zero)",
        load.rows_kept, load.rows_dropped, load.cells_defaulted
    );
    println!();
    handle_kpi(dashboard, false)?;
    println!();
    handle_trend(dashboard, false)?;
    println!();
    handle_intensity(dashboard, false)?;
    for zone in Zone::ALL {
        println!();
        let ranking = dashboard.zone_ranking(zone, &Filter::Overall);
        print_ranking(zone.title(), &ranking.states);
    }
    println!();
    handle_gap(dashboard, false)?;
    println!();
    handle_downtime(dashboard, false)
}

fn handle_filters(dashboard: &Dashboard, json: bool) -> Result<()> {
    let dataset = dashboard.dataset();
    if json {
        let choices = serde_json::json!({
            "years": dataset.years(),
            "months": dataset.months(),
            "dates": dataset.date_keys(),
        });
        return print_json(&choices);
    }
    let join = |items: Vec<String>| items.join(", ");
    println!(
        "Years:   {}",
        join(dataset.years().iter().map(ToString::to_string).collect())
    );
    println!(
        "Months:  {}",
        join(dataset.months().iter().map(ToString::to_string).collect())
    );
    println!("Dates:   {}", join(dataset.date_keys()));
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                print_json(config)?;
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Dataset]");
                println!("  Path:               {}", config.dataset_path().display());
                println!("  Delimiter:          {:?}", config.dataset.delimiter);
                println!(
                    "  Date formats:       {}",
                    config.dataset.date_formats.join(", ")
                );
                println!();
                println!("[Analysis]");
                println!(
                    "  Biometric gap ratio: {}",
                    config.analysis.biometric_gap_ratio
                );
                println!("  Downtime ratio:      {}", config.analysis.downtime_ratio);
                println!("  Top N:               {}", config.analysis.top_n);
                println!(
                    "  Gap summary limit:   {}",
                    config.analysis.gap_summary_limit
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
