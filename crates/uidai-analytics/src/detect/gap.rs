//! Child biometric update gap detection.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::Detector;
use crate::record::UpdateRecord;

/// Default fraction of `age_5_17` that `bio_age_5_17` must reach.
pub const DEFAULT_GAP_RATIO: f64 = 0.5;

/// Display label for the per-group gap row count.
pub const LOW_UPDATE_CASES_LABEL: &str = "Low Update Cases";

/// A (state, district) group with at least one gap row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GapCase {
    /// State name.
    pub state: String,
    /// District name.
    pub district: String,
    /// Number of rows in the group that failed the biometric test.
    pub low_update_cases: usize,
}

/// Flags rows where `bio_age_5_17 < age_5_17 * ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiometricGapDetector {
    ratio: f64,
}

impl Default for BiometricGapDetector {
    fn default() -> Self {
        Self::new(DEFAULT_GAP_RATIO)
    }
}

impl BiometricGapDetector {
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

    /// Whether a single row is a gap row.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_gap(&self, record: &UpdateRecord) -> bool {
        (record.counts.bio_age_5_17 as f64) < (record.counts.age_5_17 as f64) * self.ratio
    }
}

impl Detector for BiometricGapDetector {
    type Output = Vec<GapCase>;

    fn name(&self) -> &'static str {
        "biometric_gap"
    }

    /// Gap row counts per (state, district), in ascending group order.
    /// Groups without gap rows are omitted.
    fn detect<'a>(&self, records: impl IntoIterator<Item = &'a UpdateRecord>) -> Vec<GapCase> {
        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for record in records.into_iter().filter(|r| self.is_gap(r)) {
            *counts
                .entry((record.state.clone(), record.district.clone()))
                .or_default() += 1;
        }

        let cases: Vec<GapCase> = counts
            .into_iter()
            .map(|((state, district), low_update_cases)| GapCase {
                state,
                district,
                low_update_cases,
            })
            .collect();
        debug!("{}: {} groups flagged", self.name(), cases.len());
        cases
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::record::Counts;

    fn record(state: &str, district: &str, age_5_17: u64, bio_age_5_17: u64) -> UpdateRecord {
        UpdateRecord::new(
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            state.to_string(),
            district.to_string(),
            Counts {
                age_5_17,
                bio_age_5_17,
                ..Counts::default()
            },
        )
    }

    #[test]
    fn test_row_threshold() {
        let detector = BiometricGapDetector::default();
        assert!(detector.is_gap(&record("A", "X", 10, 3)));
        assert!(detector.is_gap(&record("A", "X", 10, 4)));
        assert!(!detector.is_gap(&record("A", "X", 10, 5)));
        assert!(!detector.is_gap(&record("A", "X", 10, 6)));
        assert!(!detector.is_gap(&record("A", "X", 0, 0)));
    }

    #[test]
    fn test_two_row_example() {
        let records = vec![record("A", "X", 10, 3), record("A", "X", 10, 6)];
        let cases = BiometricGapDetector::default().detect(&records);
        assert_eq!(
            cases,
            vec![GapCase {
                state: "A".to_string(),
                district: "X".to_string(),
                low_update_cases: 1,
            }]
        );
    }

    #[test]
    fn test_per_row_not_group_ratio() {
        // Group ratio is 103 / 110 > 0.5, but the first row still fails.
        let records = vec![record("A", "X", 10, 3), record("A", "X", 100, 100)];
        let cases = BiometricGapDetector::default().detect(&records);
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].low_update_cases, 1);
    }

    #[test]
    fn test_groups_without_gaps_are_omitted_and_order_is_by_key() {
        let records = vec![
            record("Kerala", "Kollam", 10, 1),
            record("Assam", "Jorhat", 10, 9),
            record("Bihar", "Patna", 10, 1),
            record("Bihar", "Gaya", 10, 1),
            record("Bihar", "Patna", 10, 2),
        ];
        let cases = BiometricGapDetector::default().detect(&records);
        let summary: Vec<(&str, &str, usize)> = cases
            .iter()
            .map(|c| (c.state.as_str(), c.district.as_str(), c.low_update_cases))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Bihar", "Gaya", 1),
                ("Bihar", "Patna", 2),
                ("Kerala", "Kollam", 1),
            ]
        );
    }

    #[test]
    fn test_custom_ratio() {
        let detector = BiometricGapDetector::new(0.8);
        assert!(detector.is_gap(&record("A", "X", 10, 7)));
        assert!(!detector.is_gap(&record("A", "X", 10, 8)));
        assert!((detector.ratio() - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn test_gap_case_serialize() {
        let case = GapCase {
            state: "A".to_string(),
            district: "X".to_string(),
            low_update_cases: 2,
        };
        let json = serde_json::to_string(&case).unwrap();
        assert!(json.contains("\"low_update_cases\":2"));
    }
}
