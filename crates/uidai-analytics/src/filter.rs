//! Time-granularity filtering.
//!
//! A [`Filter`] narrows the working set before aggregation. Matching is
//! exact with no bounds checks: a month of 13 or a date that is not in the
//! data selects nothing rather than failing.

use std::fmt;

use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};
use crate::record::UpdateRecord;

/// The granularity of a filter, without its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// No filtering.
    #[default]
    Overall,
    /// Match a calendar year.
    Year,
    /// Match a month number in every year.
    Month,
    /// Match a single date.
    Day,
}

/// A time filter over update records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Every record.
    #[default]
    Overall,
    /// Records whose year equals the value.
    Year(i32),
    /// Records whose month equals the value, across all years.
    Month(u32),
    /// Records whose `YYYY-MM-DD` date key equals the value.
    Day(String),
}

impl Filter {
    /// Build a filter from a mode and its raw text value.
    ///
    /// The value is ignored for [`FilterMode::Overall`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFilter`] if a value is required but absent, or
    /// a year or month value is not an integer. Integers outside the data's
    /// domain are accepted and simply match nothing.
    pub fn from_mode(mode: FilterMode, value: Option<&str>) -> Result<Self> {
        if mode == FilterMode::Overall {
            return Ok(Self::Overall);
        }
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::invalid_filter(format!("{mode} filter requires a value")))?;

        match mode {
            FilterMode::Overall => Ok(Self::Overall),
            FilterMode::Year => value
                .parse()
                .map(Self::Year)
                .map_err(|_| Error::invalid_filter(format!("year '{value}' is not a number"))),
            FilterMode::Month => value
                .parse()
                .map(Self::Month)
                .map_err(|_| Error::invalid_filter(format!("month '{value}' is not a number"))),
            FilterMode::Day => Ok(Self::Day(value.to_string())),
        }
    }

    /// The granularity of this filter.
    #[must_use]
    pub fn mode(&self) -> FilterMode {
        match self {
            Self::Overall => FilterMode::Overall,
            Self::Year(_) => FilterMode::Year,
            Self::Month(_) => FilterMode::Month,
            Self::Day(_) => FilterMode::Day,
        }
    }

    /// Whether a single record passes this filter.
    #[must_use]
    pub fn matches(&self, record: &UpdateRecord) -> bool {
        match self {
            Self::Overall => true,
            Self::Year(year) => record.year() == *year,
            Self::Month(month) => record.month() == *month,
            Self::Day(key) => record.date_key() == key,
        }
    }

    /// Select the matching records, preserving input order.
    #[must_use]
    pub fn resolve<'a>(&self, records: &'a [UpdateRecord]) -> Vec<&'a UpdateRecord> {
        let selected: Vec<&UpdateRecord> = records.iter().filter(|r| self.matches(r)).collect();
        trace!(
            "Filter {} selected {} of {} records",
            self,
            selected.len(),
            records.len()
        );
        selected
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => write!(f, "overall"),
            Self::Year => write!(f, "year"),
            Self::Month => write!(f, "month"),
            Self::Day => write!(f, "day"),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overall => write!(f, "overall"),
            Self::Year(year) => write!(f, "year={year}"),
            Self::Month(month) => write!(f, "month={month}"),
            Self::Day(key) => write!(f, "day={key}"),
        }
    }
}
