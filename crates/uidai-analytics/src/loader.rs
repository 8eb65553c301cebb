//! Dataset loading.
//!
//! Reads the merged update-event file into a [`Dataset`]. The header must
//! carry every required column; extra columns are ignored. Rows whose date
//! cell does not parse under any configured format are dropped, and counter
//! cells that are empty or not a non-negative whole number count as zero.
//! Both are reported in the [`LoadReport`] rather than treated as errors.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dataset::{Dataset, LoadReport};
use crate::error::{Error, Result};
use crate::record::{Column, Counts, UpdateRecord};

/// Non-counter columns every source must have.
const KEY_COLUMNS: [&str; 3] = ["date", "state", "district"];

/// Options controlling how a source is parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Date formats tried in order.
    pub date_formats: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
            date_formats: config.dataset.date_formats.clone(),
        }
    }
}

/// Names of every required column, in the order they are reported.
#[must_use]
pub fn required_columns() -> Vec<&'static str> {
    KEY_COLUMNS
        .into_iter()
        .chain(Column::ALL.into_iter().map(Column::header))
        .collect()
}

/// Load a dataset from a file.
///
/// # Errors
///
/// Returns [`Error::DatasetOpen`] if the file cannot be opened,
/// [`Error::Schema`] if required columns are missing, and [`Error::Csv`] if
/// the file is not well-formed delimited text.
pub fn load_path(path: impl AsRef<Path>, options: &LoadOptions) -> Result<Dataset> {
    let path = path.as_ref();
    debug!("Opening dataset at {}", path.display());
    let file = File::open(path).map_err(|source| Error::DatasetOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let dataset = load_reader(file, options)?;
    info!(
        "Loaded {} of {} rows from {}",
        dataset.report().rows_kept,
        dataset.report().rows_read,
        path.display()
    );
    Ok(dataset)
}

/// Load a dataset from any reader.
///
/// # Errors
///
/// Returns [`Error::Schema`] if required columns are missing and
/// [`Error::Csv`] if the input is not well-formed delimited text.
pub fn load_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let index = ColumnIndex::resolve(reader.headers()?)?;

    let mut records = Vec::new();
    let mut report = LoadReport::default();

    for (row, result) in reader.records().enumerate() {
        let raw = result?;
        report.rows_read += 1;

        let date_cell = raw.get(index.date).unwrap_or("");
        let Some(date) = parse_date(date_cell, &options.date_formats) else {
            debug!("Dropping row {}: unparseable date '{}'", row + 1, date_cell);
            report.rows_dropped += 1;
            continue;
        };

        let mut counts = Counts::default();
        for (column, &idx) in Column::ALL.into_iter().zip(index.counts.iter()) {
            let cell = raw.get(idx).unwrap_or("");
            if let Some(value) = parse_count(cell) {
                *counts.get_mut(column) = value;
            } else {
                debug!(
                    "Row {}: {} cell '{}' counted as zero",
                    row + 1,
                    column.header(),
                    cell
                );
                report.cells_defaulted += 1;
            }
        }

        records.push(UpdateRecord::new(
            date,
            cell_text(&raw, index.state),
            cell_text(&raw, index.district),
            counts,
        ));
    }

    report.rows_kept = records.len();
    if report.rows_dropped > 0 {
        warn!(
            "Dropped {} of {} rows with unparseable dates",
            report.rows_dropped, report.rows_read
        );
    }
    if report.cells_defaulted > 0 {
        warn!(
            "{} counter cells were empty or invalid and counted as zero",
            report.cells_defaulted
        );
    }

    Ok(Dataset::new(records, report))
}

/// Header positions of the required columns.
#[derive(Debug)]
struct ColumnIndex {
    date: usize,
    state: usize,
    district: usize,
    counts: [usize; 7],
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self> {
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim())
            .collect();
        let position = |name: &str| names.iter().position(|h| *h == name);

        let missing: Vec<String> = required_columns()
            .into_iter()
            .filter(|name| position(name).is_none())
            .map(String::from)
            .collect();
        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }

        let find = |name: &str| position(name).unwrap_or_default();
        let mut counts = [0; 7];
        for (slot, column) in counts.iter_mut().zip(Column::ALL) {
            *slot = find(column.header());
        }

        Ok(Self {
            date: find("date"),
            state: find("state"),
            district: find("district"),
            counts,
        })
    }
}

fn cell_text(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").trim().to_string()
}

/// Parse a date cell against each format in turn.
///
/// Formats with a time component parse as a datetime whose time is
/// discarded.
#[must_use]
pub fn parse_date(cell: &str, formats: &[String]) -> Option<NaiveDate> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    formats.iter().find_map(|format| {
        NaiveDate::parse_from_str(cell, format)
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(cell, format)
                    .ok()
                    .map(|dt| dt.date())
            })
    })
}

/// Parse a counter cell as a non-negative whole number.
///
/// Accepts integer text and integral float text such as `12.0`. Returns
/// `None` for empty, negative, fractional or non-numeric cells.
#[must_use]
#[allow(
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn parse_count(cell: &str) -> Option<u64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    if let Ok(value) = cell.parse::<u64>() {
        return Some(value);
    }
    let value = cell.parse::<f64>().ok()?;
    if value.is_finite() && value >= 0.0 && value.trunc() == value && value < u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::init_test_logging;

    const HEADER: &str = "date,state,district,age_0_5,age_5_17,age_18_greater,demo_age_5_17,demo_age_17_,bio_age_5_17,bio_age_17_";

    fn load(body: &str) -> Result<Dataset> {
        init_test_logging();
        let text = format!("{HEADER}\n{body}");
        load_reader(text.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn test_load_basic_rows() {
        let dataset = load(
            "01-03-2025,Kerala,Idukki,1,2,3,4,5,6,7\n\
             2025-03-02,Goa,North Goa,10,20,30,40,50,60,70\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.records()[0];
        assert_eq!(first.state, "Kerala");
        assert_eq!(first.district, "Idukki");
        assert_eq!(first.date_key(), "2025-03-01");
        assert_eq!(first.get(Column::Age0To5), 1);
        assert_eq!(first.get(Column::BioAge17Plus), 7);

        let second = &dataset.records()[1];
        assert_eq!(second.date_key(), "2025-03-02");
        assert_eq!(second.get(Column::DemoAge17Plus), 50);
    }

    #[test]
    fn test_unparseable_dates_are_dropped_and_counted() {
        let dataset = load(
            "not-a-date,Kerala,Idukki,1,1,1,1,1,1,1\n\
             ,Kerala,Idukki,1,1,1,1,1,1,1\n\
             31-02-2025,Kerala,Idukki,1,1,1,1,1,1,1\n\
             15/08/2024,Kerala,Idukki,1,1,1,1,1,1,1\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].date_key(), "2024-08-15");
        let report = dataset.report();
        assert_eq!(report.rows_read, 4);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(report.rows_dropped, 3);
    }

    #[test]
    fn test_derived_fields_consistent_after_load() {
        let dataset = load(
            "09-12-2024,A,X,1,1,1,1,1,1,1\n\
             2025-01-31 14:05:00,B,Y,1,1,1,1,1,1,1\n",
        )
        .unwrap();

        for record in dataset.records() {
            assert_eq!(record.year(), chrono::Datelike::year(&record.date));
            assert_eq!(record.month(), chrono::Datelike::month(&record.date));
            assert_eq!(record.date_key(), record.date.format("%Y-%m-%d").to_string());
        }
        assert_eq!(dataset.records()[1].date_key(), "2025-01-31");
    }

    #[test]
    fn test_missing_columns_fail_with_schema_error() {
        let text = "date,state,age_0_5,age_5_17,age_18_greater,demo_age_5_17,demo_age_17_,bio_age_5_17\n01-01-2025,A,1,1,1,1,1,1\n";
        let err = load_reader(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        match err {
            Error::Schema { missing } => {
                assert_eq!(missing, vec!["district", "bio_age_17_"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_header_whitespace_bom_and_extra_columns() {
        let text = "\u{feff}date , state,district,extra,age_0_5,age_5_17,age_18_greater,demo_age_5_17,demo_age_17_,bio_age_5_17,bio_age_17_\n\
                    01-01-2025,A,X,ignored,1,2,3,4,5,6,7\n";
        let dataset = load_reader(text.as_bytes(), &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.records()[0].get(Column::Age0To5), 1);
        assert_eq!(dataset.records()[0].get(Column::BioAge17Plus), 7);
    }

    #[test]
    fn test_missing_and_bad_cells_count_as_zero() {
        let dataset = load(
            "01-01-2025,A,X,,2.0,abc,-4,5,6.5,7\n\
             02-01-2025,A,X,1,2\n",
        )
        .unwrap();

        let first = &dataset.records()[0];
        assert_eq!(first.get(Column::Age0To5), 0);
        assert_eq!(first.get(Column::Age5To17), 2);
        assert_eq!(first.get(Column::Age18Plus), 0);
        assert_eq!(first.get(Column::DemoAge5To17), 0);
        assert_eq!(first.get(Column::BioAge5To17), 0);
        assert_eq!(first.get(Column::BioAge17Plus), 7);

        let second = &dataset.records()[1];
        assert_eq!(second.get(Column::Age5To17), 2);
        assert_eq!(second.get(Column::BioAge17Plus), 0);

        // 4 bad cells in the first row, 5 absent cells in the short row
        assert_eq!(dataset.report().cells_defaulted, 9);
    }

    #[test]
    fn test_custom_delimiter() {
        let text = "date;state;district;age_0_5;age_5_17;age_18_greater;demo_age_5_17;demo_age_17_;bio_age_5_17;bio_age_17_\n\
                    01-01-2025;A;X;1;2;3;4;5;6;7\n";
        let options = LoadOptions {
            delimiter: b';',
            ..LoadOptions::default()
        };
        let dataset = load_reader(text.as_bytes(), &options).unwrap();
        assert_eq!(dataset.records()[0].get(Column::Age18Plus), 3);
    }

    #[test]
    fn test_load_path_missing_file() {
        let err = load_path("/nonexistent/uidai.csv", &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DatasetOpen { .. }));
    }

    #[test]
    fn test_parse_date_formats() {
        let formats = LoadOptions::default().date_formats;
        let expected = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        assert_eq!(parse_date("07-04-2025", &formats), Some(expected));
        assert_eq!(parse_date("07/04/2025", &formats), Some(expected));
        assert_eq!(parse_date("2025-04-07", &formats), Some(expected));
        assert_eq!(parse_date("2025/04/07", &formats), Some(expected));
        assert_eq!(parse_date("2025-04-07T08:30:00", &formats), Some(expected));
        assert_eq!(parse_date(" 2025-04-07 ", &formats), Some(expected));
        assert_eq!(parse_date("April 7", &formats), None);
        assert_eq!(parse_date("", &formats), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("42"), Some(42));
        assert_eq!(parse_count(" 7 "), Some(7));
        assert_eq!(parse_count("12.0"), Some(12));
        assert_eq!(parse_count("12.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count("NaN"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_parse_count_range() {
        assert_eq!(parse_count("18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_count("1e3"), Some(1000));
        // 2^64 as text overflows u64 and rounds to exactly 2^64 as f64
        assert_eq!(parse_count("18446744073709551616"), None);
        assert_eq!(parse_count("18446744073709551616.0"), None);
        assert_eq!(parse_count("1e20"), None);
    }

    #[test]
    fn test_required_columns() {
        let columns = required_columns();
        assert_eq!(columns.len(), 10);
        assert_eq!(&columns[..3], &["date", "state", "district"]);
        assert!(columns.contains(&"demo_age_17_"));
    }
}
