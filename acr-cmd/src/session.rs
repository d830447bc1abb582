//! Loading everything one assessment run needs: configuration, the
//! airport's historical record and a forecaster.

use crate::SourceArgs;
use acr_core::{AcrConfig, CsvLayout, Forecaster, HistoricalStore};
use acr_data::{BoundedForecaster, TableForecaster, WindowMeanForecaster};
use acr_utils::dates::{parse_date, parse_month_day};
use anyhow::{anyhow, bail, Context};
use chrono::{Datelike, Local, NaiveDate};
use log::info;
use std::sync::Arc;

/// Configuration, history and forecaster for one airport.
pub struct Session {
    pub config: AcrConfig,
    pub label: String,
    pub store: Arc<HistoricalStore>,
    pub forecaster: Box<dyn Forecaster>,
}

/// Load and validate the configuration, falling back to the defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<AcrConfig> {
    match path {
        Some(path) => {
            AcrConfig::from_path(path).with_context(|| format!("loading configuration {path}"))
        }
        None => Ok(AcrConfig::default()),
    }
}

impl Session {
    pub fn open(source: &SourceArgs) -> anyhow::Result<Self> {
        let config = load_config(source.config.as_deref())?;

        let airport = match &source.airport {
            Some(code) => Some(
                config
                    .airport(code)
                    .ok_or_else(|| anyhow!("airport {code} is not in the configuration"))?
                    .clone(),
            ),
            None => None,
        };
        let (history, label) = match (&source.history, &airport) {
            (Some(path), Some(airport)) => (
                path.clone(),
                format!("{} ({})", airport.name, airport.code),
            ),
            (Some(path), None) => (path.clone(), path.clone()),
            (None, Some(airport)) => (
                airport.history.clone(),
                format!("{} ({})", airport.name, airport.code),
            ),
            (None, None) => bail!("pass --airport or --history to choose a historical record"),
        };

        let layout = CsvLayout::from_config(&config);
        let store = HistoricalStore::from_path(&history, layout)
            .with_context(|| format!("loading historical record {history}"))?;
        if let Some((first, last)) = store.date_span() {
            info!("{}: {} rows from {} to {}", label, store.len(), first, last);
        }
        let store = Arc::new(store);

        let forecaster: Box<dyn Forecaster> = match &source.forecasts {
            Some(path) => {
                let table = TableForecaster::from_path(path, layout)
                    .with_context(|| format!("loading forecasts {path}"))?;
                info!("using {} precomputed forecasts from {}", table.len(), path);
                Box::new(BoundedForecaster::new(table, config.forecast_timeout()))
            }
            None => {
                let baseline = WindowMeanForecaster::new(Arc::clone(&store), config.window_length)?;
                info!(
                    "using window-mean baseline over {} rows",
                    baseline.window_length()
                );
                Box::new(BoundedForecaster::new(baseline, config.forecast_timeout()))
            }
        };

        Ok(Session {
            config,
            label,
            store,
            forecaster,
        })
    }
}

/// Parse a target date given as "YYYY-MM-DD", or "MM-DD" / "M/D" in the
/// current year.
pub fn parse_target_date(s: &str) -> anyhow::Result<NaiveDate> {
    resolve_target_date(s, Local::now().year())
}

fn resolve_target_date(s: &str, year: i32) -> anyhow::Result<NaiveDate> {
    if let Ok(date) = parse_date(s) {
        return Ok(date);
    }
    let (month, day) = parse_month_day(s)?;
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| anyhow!("{month}/{day} does not exist in {year}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn fixture(name: &str) -> String {
        format!("{}/../fixtures/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    pub(crate) fn sample_source() -> SourceArgs {
        SourceArgs {
            config: Some(fixture("sample_config.json")),
            history: Some(fixture("sample_history.csv")),
            ..SourceArgs::default()
        }
    }

    #[test]
    fn test_open_sample_session() {
        let session = Session::open(&sample_source()).unwrap();
        assert_eq!(session.store.len(), 264);
        assert_eq!(session.store.slice(1, 28).len(), 12);
        let forecast = session
            .forecaster
            .forecast(NaiveDate::from_ymd_opt(2025, 1, 28).unwrap())
            .unwrap();
        assert_eq!(forecast.len(), 5);
    }

    #[test]
    fn test_sample_config_names_its_airport() {
        let config = load_config(Some(&fixture("sample_config.json"))).unwrap();
        assert_eq!(config.airport("smpl").unwrap().name, "Sample Airport");
    }

    #[test]
    fn test_resolve_target_date() {
        let full = resolve_target_date("2024-02-29", 2025).unwrap();
        assert_eq!(full, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

        let short = resolve_target_date("01-28", 2025).unwrap();
        assert_eq!(short, NaiveDate::from_ymd_opt(2025, 1, 28).unwrap());

        assert!(resolve_target_date("2/29", 2025).is_err());
        assert!(resolve_target_date("2/29", 2024).is_ok());
        assert!(resolve_target_date("tomorrow", 2025).is_err());
    }

    #[test]
    fn test_default_config_when_no_path() {
        let config = load_config(None).unwrap();
        assert_eq!(config, AcrConfig::default());
    }

    #[test]
    fn test_session_needs_a_history_source() {
        let err = Session::open(&SourceArgs::default()).err().unwrap();
        assert!(err.to_string().contains("--airport"));
    }

    #[test]
    fn test_unknown_airport_is_rejected() {
        let source = SourceArgs {
            airport: Some("KJFK".to_string()),
            ..SourceArgs::default()
        };
        let err = Session::open(&source).err().unwrap();
        assert!(err.to_string().contains("KJFK"));
    }
}
