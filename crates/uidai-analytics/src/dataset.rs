//! The loaded, read-only dataset.
//!
//! A [`Dataset`] is built once by the loader and never mutated afterwards.
//! It is `Send + Sync`, so a service can share one snapshot across requests
//! behind an `Arc`.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::filter::Filter;
use crate::record::UpdateRecord;

/// Data-quality counters collected while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Data rows read from the source, excluding the header.
    pub rows_read: usize,
    /// Rows kept after dropping unparseable dates.
    pub rows_kept: usize,
    /// Rows dropped because their date cell could not be parsed.
    pub rows_dropped: usize,
    /// Counter cells that were empty or unparseable and counted as zero.
    pub cells_defaulted: usize,
}

/// An immutable snapshot of update records in source order.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<UpdateRecord>,
    report: LoadReport,
}

impl Dataset {
    /// Create a dataset from loaded records and the report describing the load.
    #[must_use]
    pub fn new(records: Vec<UpdateRecord>, report: LoadReport) -> Self {
        Self { records, report }
    }

    /// Create a dataset from records built in memory.
    #[must_use]
    pub fn from_records(records: Vec<UpdateRecord>) -> Self {
        let report = LoadReport {
            rows_read: records.len(),
            rows_kept: records.len(),
            ..LoadReport::default()
        };
        Self { records, report }
    }

    /// All records, in source order.
    #[must_use]
    pub fn records(&self) -> &[UpdateRecord] {
        &self.records
    }

    /// The load report.
    #[must_use]
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records selected by `filter`, in source order.
    #[must_use]
    pub fn filter(&self, filter: &Filter) -> Vec<&UpdateRecord> {
        filter.resolve(&self.records)
    }

    /// Distinct years present, ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.distinct(UpdateRecord::year)
    }

    /// Distinct month numbers present, ascending.
    #[must_use]
    pub fn months(&self) -> Vec<u32> {
        self.distinct(UpdateRecord::month)
    }

    /// Distinct date keys present, ascending.
    #[must_use]
    pub fn date_keys(&self) -> Vec<String> {
        self.distinct(|r| r.date_key().to_string())
    }

    fn distinct<T: Ord>(&self, key: impl Fn(&UpdateRecord) -> T) -> Vec<T> {
        self.records
            .iter()
            .map(key)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
