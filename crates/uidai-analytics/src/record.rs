//! Core record types for uidai-analytics.
//!
//! This module defines one row of the update-event dataset and the closed set
//! of counter columns that queries aggregate over.

use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Format of [`UpdateRecord::date_key`].
pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// A counter column of the dataset.
///
/// Each variant is a non-negative count of update events in one age/type
/// bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    /// Enrolment updates for ages 0 to 5.
    #[serde(rename = "age_0_5")]
    Age0To5,
    /// Enrolment updates for ages 5 to 17.
    #[serde(rename = "age_5_17")]
    Age5To17,
    /// Enrolment updates for ages 18 and over.
    #[serde(rename = "age_18_greater")]
    Age18Plus,
    /// Demographic updates for ages 5 to 17.
    #[serde(rename = "demo_age_5_17")]
    DemoAge5To17,
    /// Demographic updates for ages 17 and over.
    #[serde(rename = "demo_age_17_plus")]
    DemoAge17Plus,
    /// Biometric updates for ages 5 to 17.
    #[serde(rename = "bio_age_5_17")]
    BioAge5To17,
    /// Biometric updates for ages 17 and over.
    #[serde(rename = "bio_age_17_plus")]
    BioAge17Plus,
}

impl Column {
    /// Every counter column, in source order.
    pub const ALL: [Column; 7] = [
        Column::Age0To5,
        Column::Age5To17,
        Column::Age18Plus,
        Column::DemoAge5To17,
        Column::DemoAge17Plus,
        Column::BioAge5To17,
        Column::BioAge17Plus,
    ];

    /// The three age buckets that make up a daily total.
    pub const AGE_BUCKETS: [Column; 3] = [Column::Age0To5, Column::Age5To17, Column::Age18Plus];

    /// Header name of this column in the source file.
    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Self::Age0To5 => "age_0_5",
            Self::Age5To17 => "age_5_17",
            Self::Age18Plus => "age_18_greater",
            Self::DemoAge5To17 => "demo_age_5_17",
            Self::DemoAge17Plus => "demo_age_17_",
            Self::BioAge5To17 => "bio_age_5_17",
            Self::BioAge17Plus => "bio_age_17_",
        }
    }

    /// Normalized name, used in output and accepted on the command line.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DemoAge17Plus => "demo_age_17_plus",
            Self::BioAge17Plus => "bio_age_17_plus",
            other => other.header(),
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.header() == s || c.name() == s)
            .ok_or_else(|| Error::UnknownColumn(s.to_string()))
    }
}

/// Per-row counter values, one field per [`Column`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub age_0_5: u64,
    pub age_5_17: u64,
    pub age_18_greater: u64,
    pub demo_age_5_17: u64,
    pub demo_age_17_plus: u64,
    pub bio_age_5_17: u64,
    pub bio_age_17_plus: u64,
}

impl Counts {
    /// Value of a single column.
    #[must_use]
    pub fn get(&self, column: Column) -> u64 {
        match column {
            Column::Age0To5 => self.age_0_5,
            Column::Age5To17 => self.age_5_17,
            Column::Age18Plus => self.age_18_greater,
            Column::DemoAge5To17 => self.demo_age_5_17,
            Column::DemoAge17Plus => self.demo_age_17_plus,
            Column::BioAge5To17 => self.bio_age_5_17,
            Column::BioAge17Plus => self.bio_age_17_plus,
        }
    }

    /// Mutable access to a single column.
    pub fn get_mut(&mut self, column: Column) -> &mut u64 {
        match column {
            Column::Age0To5 => &mut self.age_0_5,
            Column::Age5To17 => &mut self.age_5_17,
            Column::Age18Plus => &mut self.age_18_greater,
            Column::DemoAge5To17 => &mut self.demo_age_5_17,
            Column::DemoAge17Plus => &mut self.demo_age_17_plus,
            Column::BioAge5To17 => &mut self.bio_age_5_17,
            Column::BioAge17Plus => &mut self.bio_age_17_plus,
        }
    }
}

/// One row of the update-event dataset.
///
/// Records only exist with a valid date: rows whose date cell fails to parse
/// are dropped by the loader. The derived `year`, `month` and `date_key` are
/// computed once in [`UpdateRecord::new`] and never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateRecord {
    /// Calendar date of the update event.
    pub date: NaiveDate,
    /// State name.
    pub state: String,
    /// District name.
    pub district: String,
    /// Counter values.
    pub counts: Counts,
    year: i32,
    month: u32,
    date_key: String,
}

impl UpdateRecord {
    /// Create a record, deriving its calendar fields from `date`.
    #[must_use]
    pub fn new(date: NaiveDate, state: String, district: String, counts: Counts) -> Self {
        Self {
            date,
            state,
            district,
            counts,
            year: date.year(),
            month: date.month(),
            date_key: date.format(DATE_KEY_FORMAT).to_string(),
        }
    }

    /// Calendar year of the event.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month number of the event, 1 to 12.
    #[must_use]
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Canonical `YYYY-MM-DD` date string.
    #[must_use]
    pub fn date_key(&self) -> &str {
        &self.date_key
    }

    /// Value of a single counter column.
    #[must_use]
    pub fn get(&self, column: Column) -> u64 {
        self.counts.get(column)
    }
}
