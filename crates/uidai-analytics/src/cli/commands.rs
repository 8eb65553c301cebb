//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Subcommand, ValueEnum};

use crate::error::Result;
use crate::filter::{Filter, FilterMode};
use crate::record::Column;

/// Arguments shared by views that only print.
#[derive(Debug, Args)]
pub struct ViewCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Time filter arguments.
#[derive(Debug, Args)]
pub struct FilterArgs {
    /// Time granularity to filter by
    #[arg(long = "filter", value_enum, default_value = "overall")]
    pub mode: FilterModeArg,

    /// Filter value: a year, a month number, or a YYYY-MM-DD date
    #[arg(long)]
    pub value: Option<String>,
}

impl FilterArgs {
    /// Build the filter these arguments describe.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is missing or malformed for the mode.
    pub fn to_filter(&self) -> Result<Filter> {
        Filter::from_mode(self.mode.into(), self.value.as_deref())
    }
}

/// Top-states command arguments.
#[derive(Debug, Args)]
pub struct TopCommand {
    /// Column to rank states by: age_0_5, age_5_17, age_18_greater,
    /// demo_age_5_17, demo_age_17_plus, bio_age_5_17 or bio_age_17_plus
    #[arg(short = 'C', long, value_parser = Column::from_str)]
    pub column: Column,

    /// Time filter applied before ranking
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Zone rankings command arguments.
#[derive(Debug, Args)]
pub struct ZonesCommand {
    /// Time filter applied before ranking
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Filter mode argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FilterModeArg {
    /// No filtering
    #[default]
    Overall,
    /// Filter by year
    Year,
    /// Filter by month number, across all years
    Month,
    /// Filter by date
    Day,
}

impl From<FilterModeArg> for FilterMode {
    fn from(arg: FilterModeArg) -> Self {
        match arg {
            FilterModeArg::Overall => Self::Overall,
            FilterModeArg::Year => Self::Year,
            FilterModeArg::Month => Self::Month,
            FilterModeArg::Day => Self::Day,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_mode_arg_conversion() {
        assert_eq!(FilterMode::from(FilterModeArg::Overall), FilterMode::Overall);
        assert_eq!(FilterMode::from(FilterModeArg::Year), FilterMode::Year);
        assert_eq!(FilterMode::from(FilterModeArg::Month), FilterMode::Month);
        assert_eq!(FilterMode::from(FilterModeArg::Day), FilterMode::Day);
    }

    #[test]
    fn test_column_accepts_source_and_normalized_names() {
        for column in Column::ALL {
            assert_eq!(Column::from_str(column.name()).unwrap(), column);
            assert_eq!(Column::from_str(column.header()).unwrap(), column);
        }
    }

    #[test]
    fn test_filter_args_to_filter() {
        let args = FilterArgs {
            mode: FilterModeArg::Month,
            value: Some("5".to_string()),
        };
        assert_eq!(args.to_filter().unwrap(), Filter::Month(5));

        let args = FilterArgs {
            mode: FilterModeArg::Year,
            value: None,
        };
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_filter_mode_arg_default() {
        assert_eq!(FilterModeArg::default(), FilterModeArg::Overall);
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
