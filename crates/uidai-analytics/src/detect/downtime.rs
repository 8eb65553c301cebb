//! Downtime anomaly detection over daily totals.

use serde::Serialize;
use tracing::debug;

use super::Detector;
use crate::aggregate::{daily_totals, DailyTotal};
use crate::record::UpdateRecord;

/// Default fraction of the mean daily total below which a day is suspect.
pub const DEFAULT_DOWNTIME_RATIO: f64 = 0.3;

/// The numbers behind a downtime verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DowntimeReport {
    /// Number of distinct days in the series.
    pub days: usize,
    /// Mean daily total.
    pub mean: f64,
    /// `mean * ratio`.
    pub threshold: f64,
    /// Lowest daily total.
    pub minimum: u64,
    /// Whether `minimum < threshold`. Always false with fewer than two days.
    pub anomaly: bool,
}

/// Raises a single flag when the lowest daily total is below
/// `mean * ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DowntimeDetector {
    ratio: f64,
}

impl Default for DowntimeDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DOWNTIME_RATIO)
    }
}

impl DowntimeDetector {
    /// Create a detector with the given ratio.
    #[must_use]
    pub fn new(ratio: f64) -> Self {
        Self { ratio }
    }

    /// The ratio this detector applies.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    /// Evaluate an already-computed daily series.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&self, daily: &[DailyTotal]) -> DowntimeReport {
        let days = daily.len();
        let minimum = daily.iter().map(|d| d.total).min().unwrap_or(0);
        let mean = if days == 0 {
            0.0
        } else {
            daily.iter().map(|d| d.total as f64).sum::<f64>() / days as f64
        };
        let threshold = mean * self.ratio;
        let anomaly = days >= 2 && (minimum as f64) < threshold;

        DowntimeReport {
            days,
            mean,
            threshold,
            minimum,
            anomaly,
        }
    }
}

impl Detector for DowntimeDetector {
    type Output = DowntimeReport;

    fn name(&self) -> &'static str {
        "downtime"
    }

    fn detect<'a>(&self, records: impl IntoIterator<Item = &'a UpdateRecord>) -> DowntimeReport {
        let report = self.evaluate(&daily_totals(records));
        debug!(
            "{}: {} days, mean {:.1}, threshold {:.1}, minimum {}, anomaly {}",
            self.name(),
            report.days,
            report.mean,
            report.threshold,
            report.minimum,
            report.anomaly
        );
        report
    }
}
