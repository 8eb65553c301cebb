//! Command-line interface for uidai-analytics.
//!
//! This module provides the CLI structure for the `uidai` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, FilterArgs, FilterModeArg, TopCommand, ViewCommand, ZonesCommand,
};

use crate::error::Result;
use crate::filter::Filter;

/// uidai - Aadhaar update analytics
///
/// Loads a merged update-event dataset and prints KPI counters, trends,
/// state rankings, and update-gap and downtime heuristics.
#[derive(Debug, Parser)]
#[command(name = "uidai")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the dataset, overriding the configured one
    #[arg(short, long, global = true, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show headline counters
    Kpi(ViewCommand),

    /// Show daily update totals
    Trend(ViewCommand),

    /// Show age-bucket sums per state
    Intensity(ViewCommand),

    /// Rank states by a column under a time filter
    Top(TopCommand),

    /// Show the migration, marriage and child-transition zone rankings
    Zones(ZonesCommand),

    /// Show districts with low child biometric updates
    Gap(ViewCommand),

    /// Check daily totals for a downtime anomaly
    Downtime(ViewCommand),

    /// Show every view at once
    Report(ViewCommand),

    /// List the years, months and dates available for filtering
    Filters(ViewCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// The time filter this command ranks under.
    ///
    /// Commands without filter arguments use [`Filter::Overall`].
    ///
    /// # Errors
    ///
    /// Returns an error if the filter arguments are missing a value or the
    /// value is malformed for the mode.
    pub fn filter(&self) -> Result<Filter> {
        match self {
            Self::Top(cmd) => cmd.filter.to_filter(),
            Self::Zones(cmd) => cmd.filter.to_filter(),
            _ => Ok(Filter::Overall),
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
