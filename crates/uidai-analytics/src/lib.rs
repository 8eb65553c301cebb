//! `uidai-analytics` - Aggregate views over Aadhaar update event data
//!
//! This library loads a merged dataset of update events once and answers the
//! queries behind an update-analytics dashboard: KPI counters, daily trends,
//! state-wise intensity and rankings, and two rule-based heuristics (child
//! biometric update gaps and downtime anomalies).

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dataset;
pub mod detect;
pub mod error;
pub mod filter;
pub mod loader;
pub mod logging;
pub mod record;

pub use aggregate::{aggregate_by, daily_totals, Aggregation, DailyTotal, GroupBy, GroupKey};
pub use config::Config;
pub use dashboard::{Dashboard, DashboardReport, KpiTotals, StateIntensity, StateTotal, Zone};
pub use dataset::{Dataset, LoadReport};
pub use error::{Error, Result};
pub use filter::{Filter, FilterMode};
pub use logging::init_logging;
pub use record::{Column, Counts, UpdateRecord};
