//! Dashboard queries.
//!
//! [`Dashboard`] binds one immutable [`Dataset`] to the analysis settings
//! and answers the queries a presentation layer needs. Every query is a
//! fresh pass over the records; per-request choices such as filters and
//! columns are explicit arguments, never stored state.

use serde::Serialize;
use tracing::debug;

use crate::aggregate::{aggregate_by, daily_totals, DailyTotal, GroupBy, GroupKey};
use crate::config::{AnalysisConfig, Config};
use crate::dataset::{Dataset, LoadReport};
use crate::detect::{BiometricGapDetector, Detector, DowntimeDetector, DowntimeReport, GapCase};
use crate::error::Result;
use crate::filter::Filter;
use crate::loader::{self, LoadOptions};
use crate::record::Column;

/// Headline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KpiTotals {
    /// Sum of all seven counter columns.
    pub total_updates: u64,
    /// Sum of `age_5_17`.
    pub children_5_to_17: u64,
    /// Sum of `age_18_greater`.
    pub adults_18_plus: u64,
}

/// Age-bucket sums for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateIntensity {
    /// State name.
    pub state: String,
    /// Sum of `age_0_5`.
    pub age_0_5: u64,
    /// Sum of `age_5_17`.
    pub age_5_17: u64,
    /// Sum of `age_18_greater`.
    pub age_18_greater: u64,
}

/// One entry of a state ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTotal {
    /// State name.
    pub state: String,
    /// Sum of the ranked column.
    pub total: u64,
}

/// A behaviour zone: a named state ranking over one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Adult (18+) update activity.
    Migration,
    /// Adult demographic update activity.
    Marriage,
    /// Child (5 to 17) update activity.
    ChildTransition,
}

impl Zone {
    /// All zones, in display order.
    pub const ALL: [Zone; 3] = [Zone::Migration, Zone::Marriage, Zone::ChildTransition];

    /// The column this zone ranks by.
    #[must_use]
    pub fn column(self) -> Column {
        match self {
            Self::Migration => Column::Age18Plus,
            Self::Marriage => Column::DemoAge17Plus,
            Self::ChildTransition => Column::Age5To17,
        }
    }

    /// Human-readable title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Migration => "Migration-driven zones (adults 18+)",
            Self::Marriage => "Marriage-driven zones (demographic updates)",
            Self::ChildTransition => "Child-transition zones (age 5-17)",
        }
    }
}

/// A zone's ranking under a filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ZoneRanking {
    /// The zone.
    pub zone: Zone,
    /// The ranked column.
    pub column: Column,
    /// The filter applied before ranking.
    pub filter: Filter,
    /// Top states, highest first.
    pub states: Vec<StateTotal>,
}

/// Every dashboard view in one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    /// How the dataset loaded.
    pub load: LoadReport,
    /// Headline counters.
    pub kpi: KpiTotals,
    /// Daily totals.
    pub daily_trend: Vec<DailyTotal>,
    /// State-wise age-bucket sums.
    pub state_intensity: Vec<StateIntensity>,
    /// Zone rankings, unfiltered.
    pub zones: Vec<ZoneRanking>,
    /// Biometric gap groups.
    pub biometric_gaps: Vec<GapCase>,
    /// Downtime verdict.
    pub downtime: DowntimeReport,
}

/// Query entry point over a loaded dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    dataset: Dataset,
    analysis: AnalysisConfig,
}

impl Dashboard {
    /// Create a dashboard over an already-loaded dataset.
    #[must_use]
    pub fn new(dataset: Dataset, analysis: AnalysisConfig) -> Self {
        Self { dataset, analysis }
    }

    /// Load the configured dataset and build a dashboard over it.
    ///
    /// # Errors
    ///
    /// Returns an error if the dataset cannot be loaded.
    pub fn load(config: &Config) -> Result<Self> {
        let dataset = loader::load_path(config.dataset_path(), &LoadOptions::from(config))?;
        Ok(Self::new(dataset, config.analysis.clone()))
    }

    /// The underlying dataset.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// The analysis settings in effect.
    #[must_use]
    pub fn analysis(&self) -> &AnalysisConfig {
        &self.analysis
    }

    /// Headline counters over the whole dataset.
    #[must_use]
    pub fn kpi_totals(&self) -> KpiTotals {
        let records = self.dataset.records();
        let sum = |column: Column| {
            records
                .iter()
                .map(|r| r.get(column))
                .fold(0, u64::saturating_add)
        };
        KpiTotals {
            total_updates: Column::ALL.into_iter().map(sum).fold(0, u64::saturating_add),
            children_5_to_17: sum(Column::Age5To17),
            adults_18_plus: sum(Column::Age18Plus),
        }
    }

    /// Daily age-bucket totals, in date order.
    #[must_use]
    pub fn daily_trend(&self) -> Vec<DailyTotal> {
        daily_totals(self.dataset.records())
    }

    /// Age-bucket sums per state, in state order.
    #[must_use]
    pub fn state_intensity(&self) -> Vec<StateIntensity> {
        aggregate_by(self.dataset.records(), GroupBy::State, &Column::AGE_BUCKETS)
            .iter()
            .filter_map(|(key, sums)| match (key, sums) {
                (GroupKey::State(state), &[age_0_5, age_5_17, age_18_greater]) => {
                    Some(StateIntensity {
                        state: state.clone(),
                        age_0_5,
                        age_5_17,
                        age_18_greater,
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// The top states by `column` after applying `filter`.
    ///
    /// At most `top_n` entries, highest first, ties by ascending state name.
    /// A filter that selects nothing yields an empty ranking.
    #[must_use]
    pub fn top_states_by(&self, column: Column, filter: &Filter) -> Vec<StateTotal> {
        let selected = self.dataset.filter(filter);
        debug!(
            "Ranking {} states over {} records ({})",
            column,
            selected.len(),
            filter
        );
        aggregate_by(selected, GroupBy::State, &[column])
            .top_n(column, self.analysis.top_n)
            .into_iter()
            .filter_map(|(key, total)| match key {
                GroupKey::State(state) => Some(StateTotal { state, total }),
                _ => None,
            })
            .collect()
    }

    /// A behaviour zone's ranking under `filter`.
    #[must_use]
    pub fn zone_ranking(&self, zone: Zone, filter: &Filter) -> ZoneRanking {
        ZoneRanking {
            zone,
            column: zone.column(),
            filter: filter.clone(),
            states: self.top_states_by(zone.column(), filter),
        }
    }

    /// Biometric gap groups, first `gap_summary_limit` in group order.
    #[must_use]
    pub fn biometric_gap_summary(&self) -> Vec<GapCase> {
        let mut cases = self.gap_detector().detect(self.dataset.records());
        cases.truncate(self.analysis.gap_summary_limit);
        cases
    }

    /// Whether the daily series shows a downtime anomaly.
    #[must_use]
    pub fn downtime_anomaly(&self) -> bool {
        self.downtime_report().anomaly
    }

    /// The downtime verdict with the numbers behind it.
    #[must_use]
    pub fn downtime_report(&self) -> DowntimeReport {
        self.downtime_detector().detect(self.dataset.records())
    }

    /// Every view, unfiltered.
    #[must_use]
    pub fn report(&self) -> DashboardReport {
        DashboardReport {
            load: *self.dataset.report(),
            kpi: self.kpi_totals(),
            daily_trend: self.daily_trend(),
            state_intensity: self.state_intensity(),
            zones: Zone::ALL
                .into_iter()
                .map(|zone| self.zone_ranking(zone, &Filter::Overall))
                .collect(),
            biometric_gaps: self.biometric_gap_summary(),
            downtime: self.downtime_report(),
        }
    }

    fn gap_detector(&self) -> BiometricGapDetector {
        BiometricGapDetector::new(self.analysis.biometric_gap_ratio)
    }

    fn downtime_detector(&self) -> DowntimeDetector {
        DowntimeDetector::new(self.analysis.downtime_ratio)
    }
}
