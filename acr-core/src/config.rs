//! Startup configuration: feature set, thresholds, window/span lengths and
//! the airports the tool knows about.
//!
//! Loaded once from JSON (or taken from [`AcrConfig::default`]) and passed
//! by reference into every component; nothing here is mutated afterwards.

use crate::error::{AcrError, Result};
use crate::feature::FeatureSet;
use crate::threshold::ThresholdPolicy;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Number of past calendar-day rows a forecaster consumes.
pub const DEFAULT_WINDOW_LENGTH: usize = 7;

/// Number of consecutive days in a multi-day query.
pub const DEFAULT_SPAN_LENGTH: usize = 7;

pub const DEFAULT_TIMESTAMP_COLUMN: &str = "date";

pub const DEFAULT_FORECAST_TIMEOUT_SECS: u64 = 30;

/// An airport with its historical daily weather record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportConfig {
    /// Display name, e.g. "Incheon Airport".
    pub name: String,
    /// ICAO code, e.g. "RKSI".
    pub code: String,
    /// Path to the historical CSV (optionally `.gz`).
    pub history: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcrConfig {
    pub features: FeatureSet,
    pub thresholds: ThresholdPolicy,
    #[serde(default = "default_window_length")]
    pub window_length: usize,
    #[serde(default = "default_span_length")]
    pub span_length: usize,
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    #[serde(default = "default_forecast_timeout_secs")]
    pub forecast_timeout_secs: u64,
    /// Header used in the CSV files for a feature or the timestamp column
    /// when it differs from the name, e.g. `"date": "일시"`.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub airports: Vec<AirportConfig>,
}

fn default_window_length() -> usize {
    DEFAULT_WINDOW_LENGTH
}

fn default_span_length() -> usize {
    DEFAULT_SPAN_LENGTH
}

fn default_timestamp_column() -> String {
    DEFAULT_TIMESTAMP_COLUMN.to_string()
}

fn default_forecast_timeout_secs() -> u64 {
    DEFAULT_FORECAST_TIMEOUT_SECS
}

impl Default for AcrConfig {
    fn default() -> Self {
        let thresholds = ThresholdPolicy::new()
            .with("mean_wind_speed_kt", 25.0)
            .with("max_gust_kt", 35.0)
            .with("total_precipitation_mm", 110.0)
            .with("max_hourly_precipitation_mm", 20.0)
            .with("max_fresh_snow_depth_cm", 5.0);
        AcrConfig {
            features: FeatureSet(vec![
                "mean_wind_speed_kt".to_string(),
                "max_gust_kt".to_string(),
                "total_precipitation_mm".to_string(),
                "max_hourly_precipitation_mm".to_string(),
                "max_fresh_snow_depth_cm".to_string(),
            ]),
            thresholds,
            window_length: DEFAULT_WINDOW_LENGTH,
            span_length: DEFAULT_SPAN_LENGTH,
            timestamp_column: default_timestamp_column(),
            forecast_timeout_secs: DEFAULT_FORECAST_TIMEOUT_SECS,
            columns: [
                (DEFAULT_TIMESTAMP_COLUMN, "일시"),
                ("mean_wind_speed_kt", "평균풍속(KT)"),
                ("max_gust_kt", "최대순간풍속(KT)"),
                ("total_precipitation_mm", "강수량합(mm)"),
                ("max_hourly_precipitation_mm", "1시간최다강수(mm)"),
                ("max_fresh_snow_depth_cm", "최심신적설(cm)"),
            ]
            .into_iter()
            .map(|(name, header)| (name.to_string(), header.to_string()))
            .collect(),
            airports: vec![
                AirportConfig {
                    name: "Incheon Airport".to_string(),
                    code: "RKSI".to_string(),
                    history: "icn/icn_2000-2025.csv".to_string(),
                },
                AirportConfig {
                    name: "Gimpo Airport".to_string(),
                    code: "RKSS".to_string(),
                    history: "gmp/gmp_1970-2025.csv".to_string(),
                },
            ],
        }
    }
}

impl AcrConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AcrConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| AcrError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json_str(&json)
    }

    /// Check the configuration is usable before any estimation runs.
    pub fn validate(&self) -> Result<()> {
        if self.features.is_empty() {
            return Err(AcrError::configuration("feature set is empty"));
        }
        self.thresholds.resolve(&self.features)?;
        if self.window_length == 0 {
            return Err(AcrError::configuration("window_length must be at least 1"));
        }
        if self.span_length == 0 {
            return Err(AcrError::configuration("span_length must be at least 1"));
        }
        if self.timestamp_column.trim().is_empty() {
            return Err(AcrError::configuration("timestamp_column is blank"));
        }
        if self.features.index_of(&self.timestamp_column).is_some() {
            return Err(AcrError::configuration(format!(
                "timestamp column '{}' is also listed as a feature",
                self.timestamp_column
            )));
        }
        for (name, header) in &self.columns {
            if header.trim().is_empty() {
                return Err(AcrError::configuration(format!(
                    "column header for '{name}' is blank"
                )));
            }
            if name != &self.timestamp_column && self.features.index_of(name).is_none() {
                warn!("column header given for unknown feature '{}'", name);
            }
        }
        Ok(())
    }

    pub fn forecast_timeout(&self) -> Duration {
        Duration::from_secs(self.forecast_timeout_secs)
    }

    /// Look up an airport by ICAO code (case-insensitive).
    pub fn airport(&self, code: &str) -> Option<&AirportConfig> {
        self.airports
            .iter()
            .find(|airport| airport.code.eq_ignore_ascii_case(code))
    }
}
