//! Grouped sums over update records.
//!
//! An [`Aggregation`] is a fresh, ordered view: groups iterate in ascending
//! key order (states lexicographically, dates chronologically), and the
//! records it was built from are never touched. Sums saturate at
//! `u64::MAX` rather than overflow.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::record::{Column, UpdateRecord};

/// Dimension to group records by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupBy {
    /// Group by state.
    State,
    /// Group by calendar date.
    Date,
    /// Group by (state, district) pair.
    StateDistrict,
}

/// The key of one group in an [`Aggregation`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    /// A state name.
    State(String),
    /// A calendar date.
    Date(NaiveDate),
    /// A (state, district) pair.
    StateDistrict(String, String),
}

impl GroupKey {
    fn of(record: &UpdateRecord, group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::State => Self::State(record.state.clone()),
            GroupBy::Date => Self::Date(record.date),
            GroupBy::StateDistrict => {
                Self::StateDistrict(record.state.clone(), record.district.clone())
            }
        }
    }
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(state) => write!(f, "{state}"),
            Self::Date(date) => write!(f, "{date}"),
            Self::StateDistrict(state, district) => write!(f, "{state} / {district}"),
        }
    }
}

/// Per-group sums of a fixed set of columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    columns: Vec<Column>,
    groups: BTreeMap<GroupKey, Vec<u64>>,
}

/// Sum `columns` over `records`, grouped by `group_by`.
///
/// Every record lands in exactly one group, so the per-column sum over all
/// groups equals the column sum over the input.
pub fn aggregate_by<'a, I>(records: I, group_by: GroupBy, columns: &[Column]) -> Aggregation
where
    I: IntoIterator<Item = &'a UpdateRecord>,
{
    let mut groups: BTreeMap<GroupKey, Vec<u64>> = BTreeMap::new();
    for record in records {
        let sums = groups
            .entry(GroupKey::of(record, group_by))
            .or_insert_with(|| vec![0; columns.len()]);
        for (sum, column) in sums.iter_mut().zip(columns) {
            *sum = sum.saturating_add(record.get(*column));
        }
    }
    Aggregation {
        columns: columns.to_vec(),
        groups,
    }
}

impl Aggregation {
    /// The aggregated columns, in the order sums are stored.
    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in ascending key order, with sums in [`Aggregation::columns`]
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &[u64])> {
        self.groups.iter().map(|(key, sums)| (key, sums.as_slice()))
    }

    /// Sum of `column` for one group.
    #[must_use]
    pub fn value(&self, key: &GroupKey, column: Column) -> Option<u64> {
        let idx = self.index_of(column)?;
        self.groups.get(key).map(|sums| sums[idx])
    }

    /// Sum of `column` across all groups.
    #[must_use]
    pub fn column_total(&self, column: Column) -> Option<u64> {
        let idx = self.index_of(column)?;
        Some(
            self.groups
                .values()
                .map(|sums| sums[idx])
                .fold(0, u64::saturating_add),
        )
    }

    /// Groups with their across-column row total, in key order.
    pub fn row_totals(&self) -> impl Iterator<Item = (&GroupKey, u64)> {
        self.groups
            .iter()
            .map(|(key, sums)| (key, sums.iter().copied().fold(0, u64::saturating_add)))
    }

    /// The `n` groups with the largest `column` sum.
    ///
    /// Ranked by descending sum; equal sums keep ascending key order.
    /// Returns an empty list if `column` was not aggregated.
    #[must_use]
    pub fn top_n(&self, column: Column, n: usize) -> Vec<(GroupKey, u64)> {
        let Some(idx) = self.index_of(column) else {
            return Vec::new();
        };
        let mut ranked: Vec<(GroupKey, u64)> = self
            .groups
            .iter()
            .map(|(key, sums)| (key.clone(), sums[idx]))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(n);
        ranked
    }

    fn index_of(&self, column: Column) -> Option<usize> {
        self.columns.iter().position(|c| *c == column)
    }
}

/// Total updates across the age buckets on one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    /// The date.
    pub date: NaiveDate,
    /// `age_0_5 + age_5_17 + age_18_greater` summed over the date's records.
    pub total: u64,
}

/// Per-date totals of the three age buckets, in date order.
pub fn daily_totals<'a, I>(records: I) -> Vec<DailyTotal>
where
    I: IntoIterator<Item = &'a UpdateRecord>,
{
    aggregate_by(records, GroupBy::Date, &Column::AGE_BUCKETS)
        .row_totals()
        .filter_map(|(key, total)| match key {
            GroupKey::Date(date) => Some(DailyTotal { date: *date, total }),
            _ => None,
        })
        .collect()
}
