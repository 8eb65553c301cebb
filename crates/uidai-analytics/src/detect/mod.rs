//! Rule-based heuristics over update records.
//!
//! Two independent, stateless detectors:
//!
//! - **Biometric gap** ([`BiometricGapDetector`]): counts, per
//!   (state, district), the rows where child biometric updates fall below a
//!   fraction of child enrolment updates. The test is applied row by row
//!   before counting; a group is never judged on its aggregate ratio.
//!
//! - **Downtime** ([`DowntimeDetector`]): a single series-wide flag raised
//!   when the lowest daily total falls below a fraction of the mean daily
//!   total. It does not say which day.
//!
//! # Example
//!
//! ```
//! use uidai_analytics::detect::{Detector, DowntimeDetector};
//! use uidai_analytics::UpdateRecord;
//!
//! let records: Vec<UpdateRecord> = Vec::new();
//! let report = DowntimeDetector::default().detect(&records);
//! assert!(!report.anomaly);
//! ```

mod downtime;
mod gap;

pub use downtime::{DowntimeDetector, DowntimeReport, DEFAULT_DOWNTIME_RATIO};
pub use gap::{BiometricGapDetector, GapCase, DEFAULT_GAP_RATIO, LOW_UPDATE_CASES_LABEL};

use crate::record::UpdateRecord;

/// A heuristic evaluated over a set of records.
pub trait Detector {
    /// What the detector reports.
    type Output;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate the heuristic. Records are only read.
    fn detect<'a>(&self, records: impl IntoIterator<Item = &'a UpdateRecord>) -> Self::Output;
}
