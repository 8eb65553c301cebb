//! Configuration management for uidai-analytics.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration directory name.
const CONFIG_DIR_NAME: &str = "uidai-analytics";

/// Default dataset file name, resolved against the working directory.
const DATASET_FILE_NAME: &str = "uidai_final_merged.csv";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "UIDAI_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `UIDAI_`, `__` between sections)
/// 2. TOML config file at `~/.config/uidai-analytics/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset source configuration.
    pub dataset: DatasetConfig,
    /// Heuristic thresholds and view sizes.
    pub analysis: AnalysisConfig,
}

/// Dataset source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the dataset file.
    /// Defaults to `uidai_final_merged.csv` in the working directory.
    pub path: Option<PathBuf>,
    /// Field delimiter. Must be a single ASCII character.
    pub delimiter: char,
    /// Date formats tried in order when parsing the `date` column.
    pub date_formats: Vec<String>,
}

/// Heuristic thresholds and view sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// A row is a biometric gap when `bio_age_5_17 < age_5_17 * ratio`.
    pub biometric_gap_ratio: f64,
    /// Downtime is signalled when the lowest daily total is below
    /// `mean * ratio`.
    pub downtime_ratio: f64,
    /// Number of states in a top-N ranking.
    pub top_n: usize,
    /// Number of groups shown in the biometric gap summary.
    pub gap_summary_limit: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None, // Will be resolved to default at runtime
            delimiter: ',',
            date_formats: default_date_formats(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            biometric_gap_ratio: 0.5,
            downtime_ratio: 0.3,
            top_n: 10,
            gap_summary_limit: 15,
        }
    }
}

/// Default date formats: day-first forms, then ISO dates and datetimes.
fn default_date_formats() -> Vec<String> {
    vec![
        "%d-%m-%Y".to_string(),
        "%d/%m/%Y".to_string(),
        "%Y-%m-%d".to_string(),
        "%Y/%m/%d".to_string(),
        "%Y-%m-%d %H:%M:%S".to_string(),
        "%Y-%m-%dT%H:%M:%S".to_string(),
    ]
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// A config file that does not exist is skipped, leaving defaults and
    /// environment overrides in place.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.dataset.delimiter.is_ascii() {
            return Err(Error::config_validation(format!(
                "delimiter '{}' must be a single ASCII character",
                self.dataset.delimiter
            )));
        }

        if self.dataset.date_formats.is_empty() {
            return Err(Error::config_validation(
                "date_formats must contain at least one format",
            ));
        }

        for format in &self.dataset.date_formats {
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(Error::config_validation(format!(
                    "invalid date format: {format}"
                )));
            }
        }

        for (name, ratio) in [
            ("biometric_gap_ratio", self.analysis.biometric_gap_ratio),
            ("downtime_ratio", self.analysis.downtime_ratio),
        ] {
            if !ratio.is_finite() || ratio <= 0.0 {
                return Err(Error::config_validation(format!(
                    "{name} must be a positive number, got {ratio}"
                )));
            }
        }

        if self.analysis.top_n == 0 {
            return Err(Error::config_validation("top_n must be greater than 0"));
        }

        if self.analysis.gap_summary_limit == 0 {
            return Err(Error::config_validation(
                "gap_summary_limit must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Get the dataset path, resolving defaults if not set.
    #[must_use]
    pub fn dataset_path(&self) -> PathBuf {
        self.dataset
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DATASET_FILE_NAME))
    }

    /// Get the delimiter as the byte the CSV reader expects.
    #[must_use]
    pub fn delimiter_byte(&self) -> u8 {
        u8::try_from(self.dataset.delimiter).unwrap_or(b',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.dataset.path.is_none());
        assert_eq!(config.dataset.delimiter, ',');
        assert!((config.analysis.biometric_gap_ratio - 0.5).abs() < f64::EPSILON);
        assert!((config.analysis.downtime_ratio - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.analysis.top_n, 10);
        assert_eq!(config.analysis.gap_summary_limit, 15);
    }

    #[test]
    fn test_default_date_formats_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.dataset.date_formats[0], "%d-%m-%Y");
    }

    #[test]
    fn test_validate_non_ascii_delimiter() {
        let mut config = Config::default();
        config.dataset.delimiter = '§';

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("delimiter"));
    }

    #[test]
    fn test_validate_empty_date_formats() {
        let mut config = Config::default();
        config.dataset.date_formats.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("date_formats"));
    }

    #[test]
    fn test_validate_bad_date_format() {
        let mut config = Config::default();
        config.dataset.date_formats = vec!["%Q-%m".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("invalid date format"));
    }

    #[test]
    fn test_validate_zero_ratio() {
        let mut config = Config::default();
        config.analysis.downtime_ratio = 0.0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("downtime_ratio"));
    }

    #[test]
    fn test_validate_nan_ratio() {
        let mut config = Config::default();
        config.analysis.biometric_gap_ratio = f64::NAN;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("biometric_gap_ratio"));
    }

    #[test]
    fn test_validate_zero_top_n() {
        let mut config = Config::default();
        config.analysis.top_n = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("top_n"));
    }

    #[test]
    fn test_validate_zero_gap_limit() {
        let mut config = Config::default();
        config.analysis.gap_summary_limit = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("gap_summary_limit"));
    }

    #[test]
    fn test_dataset_path_default() {
        let config = Config::default();
        assert_eq!(config.dataset_path(), PathBuf::from("uidai_final_merged.csv"));
    }

    #[test]
    fn test_dataset_path_custom() {
        let mut config = Config::default();
        config.dataset.path = Some(PathBuf::from("/data/updates.csv"));
        assert_eq!(config.dataset_path(), PathBuf::from("/data/updates.csv"));
    }

    #[test]
    fn test_delimiter_byte() {
        let mut config = Config::default();
        assert_eq!(config.delimiter_byte(), b',');
        config.dataset.delimiter = ';';
        assert_eq!(config.delimiter_byte(), b';');
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("uidai-analytics"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let result = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml")));
        assert!(result.is_ok());
    }

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_from_file() {
        let (_dir, path) = write_config(
            "[dataset]\ndelimiter = \";\"\n\n[analysis]\ntop_n = 3\n",
        );
        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.analysis.top_n, 3);
        assert_eq!(config.dataset.delimiter, ';');
        assert_eq!(config.analysis.gap_summary_limit, 15);
    }

    #[test]
    fn test_load_from_file_validates() {
        let (_dir, path) = write_config("[analysis]\ntop_n = 0\n");
        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigValidation { .. }));
    }

    #[test]
    fn test_load_from_malformed_file() {
        let (_dir, path) = write_config("[analysis\ntop_n = ");
        let err = Config::load_from(Some(path)).unwrap_err();
        assert!(matches!(err, Error::ConfigLoad(_)));
    }

    #[test]
    fn test_analysis_config_deserialize() {
        let json = r#"{"top_n": 5, "downtime_ratio": 0.25}"#;
        let analysis: AnalysisConfig = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.top_n, 5);
        assert!((analysis.downtime_ratio - 0.25).abs() < f64::EPSILON);
        assert_eq!(analysis.gap_summary_limit, 15);
    }

    #[test]
    fn test_dataset_config_serialize() {
        let dataset = DatasetConfig::default();
        let json = serde_json::to_string(&dataset).unwrap();
        assert!(json.contains("date_formats"));
        assert!(json.contains("delimiter"));
    }

    #[test]
    fn test_config_clone() {
        let config = Config::default();
        assert_eq!(config.clone(), config);
    }
}
