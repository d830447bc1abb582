//! Forecaster implementations that ship with the toolkit.
//!
//! The trained sequence model lives outside this workspace. These cover the
//! remaining cases: a deterministic baseline that uses the same input
//! window as the model, a table of forecasts exported by an external
//! model run, and a timeout wrapper for anything slow.

use acr_core::{
    AcrError, BlankCell, CsvLayout, FeatureVector, ForecastError, Forecaster, HistoricalStore,
    Result,
};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Baseline forecaster: the per-feature mean of the most recent
/// `window_length` recorded rows for the target's calendar day.
///
/// Rows are taken from the target's (month, day) across years, dated on
/// or before the target. Fewer than `window_length` such rows is
/// [`ForecastError::InsufficientHistory`].
#[derive(Debug, Clone)]
pub struct WindowMeanForecaster {
    store: Arc<HistoricalStore>,
    window_length: usize,
}

impl WindowMeanForecaster {
    pub fn new(store: Arc<HistoricalStore>, window_length: usize) -> Result<Self> {
        if window_length == 0 {
            return Err(AcrError::configuration("window_length must be at least 1"));
        }
        Ok(WindowMeanForecaster {
            store,
            window_length,
        })
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }
}

impl Forecaster for WindowMeanForecaster {
    fn forecast(&self, target: NaiveDate) -> std::result::Result<FeatureVector, ForecastError> {
        let eligible = self
            .store
            .slice(target.month(), target.day())
            .through(target);
        if eligible.len() < self.window_length {
            return Err(ForecastError::InsufficientHistory {
                month: target.month(),
                day: target.day(),
                available: eligible.len(),
                required: self.window_length,
            });
        }

        let window = eligible.most_recent(self.window_length);
        let mut sums = vec![0.0; self.store.features().len()];
        for entry in window {
            for (sum, value) in sums.iter_mut().zip(&entry.values) {
                *sum += value;
            }
        }
        let n = window.len() as f64;
        debug!(
            "window mean for {} from {} rows ({} to {})",
            target,
            window.len(),
            window[0].date,
            window[window.len() - 1].date
        );
        Ok(sums.into_iter().map(|sum| sum / n).collect())
    }
}

/// Forecasts produced ahead of time, one row per target date.
///
/// Uses the same CSV layout as the historical record: a timestamp column
/// plus one column per feature. Every cell must hold a value; a blank
/// forecast cell is a load error rather than a zero.
#[derive(Debug, Clone)]
pub struct TableForecaster {
    forecasts: BTreeMap<NaiveDate, FeatureVector>,
}

impl TableForecaster {
    pub fn new(forecasts: BTreeMap<NaiveDate, FeatureVector>) -> Self {
        TableForecaster { forecasts }
    }

    pub fn from_csv_str(csv_data: &str, layout: CsvLayout<'_>) -> Result<Self> {
        let table =
            HistoricalStore::from_csv_str(csv_data, layout.with_blank_cell(BlankCell::Reject))?;
        Ok(Self::from_store(&table))
    }

    pub fn from_path(path: impl AsRef<Path>, layout: CsvLayout<'_>) -> Result<Self> {
        let table = HistoricalStore::from_path(path, layout.with_blank_cell(BlankCell::Reject))?;
        Ok(Self::from_store(&table))
    }

    fn from_store(table: &HistoricalStore) -> Self {
        Self::new(
            table
                .entries()
                .iter()
                .map(|entry| (entry.date, entry.values.clone()))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.forecasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forecasts.is_empty()
    }
}

impl Forecaster for TableForecaster {
    fn forecast(&self, target: NaiveDate) -> std::result::Result<FeatureVector, ForecastError> {
        self.forecasts
            .get(&target)
            .cloned()
            .ok_or_else(|| ForecastError::Service(format!("no forecast recorded for {target}")))
    }
}

/// Runs each forecast on a worker thread and gives up after `timeout`.
///
/// A timed-out worker is detached and its eventual result discarded.
pub struct BoundedForecaster<F> {
    inner: Arc<F>,
    timeout: Duration,
}

impl<F> BoundedForecaster<F>
where
    F: Forecaster + Send + Sync + 'static,
{
    pub fn new(inner: F, timeout: Duration) -> Self {
        BoundedForecaster {
            inner: Arc::new(inner),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl<F> Forecaster for BoundedForecaster<F>
where
    F: Forecaster + Send + Sync + 'static,
{
    fn forecast(&self, target: NaiveDate) -> std::result::Result<FeatureVector, ForecastError> {
        let (tx, rx) = mpsc::channel();
        let inner = Arc::clone(&self.inner);
        thread::Builder::new()
            .name(format!("forecast-{target}"))
            .spawn(move || {
                // the receiver is gone once the caller has timed out
                let _ = tx.send(inner.forecast(target));
            })
            .map_err(|e| ForecastError::Service(format!("could not start forecast worker: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(ForecastError::TimedOut(self.timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(ForecastError::Service(
                "forecast worker stopped without a result".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::tests::{date, features};
    use acr_core::HistoricalEntry;

    fn store_with_years(years: std::ops::Range<i32>) -> Arc<HistoricalStore> {
        let entries = years
            .map(|year| {
                let v = f64::from(year - 2000);
                HistoricalEntry::new(date(year, 1, 28), vec![v, v * 2.0, 0.0])
            })
            .collect();
        Arc::new(HistoricalStore::new(features(), entries).unwrap())
    }

    #[test]
    fn test_window_mean_uses_most_recent_rows() {
        let forecaster = WindowMeanForecaster::new(store_with_years(2010..2020), 3).unwrap();
        // 2017, 2018, 2019 -> 17, 18, 19
        let forecast = forecaster.forecast(date(2025, 1, 28)).unwrap();
        assert_eq!(forecast, vec![18.0, 36.0, 0.0]);
    }

    #[test]
    fn test_window_mean_ignores_rows_after_target() {
        let forecaster = WindowMeanForecaster::new(store_with_years(2010..2020), 2).unwrap();
        // 2014, 2015 -> 14, 15
        let forecast = forecaster.forecast(date(2015, 1, 28)).unwrap();
        assert_eq!(forecast[0], 14.5);
    }

    #[test]
    fn test_window_mean_reports_insufficient_history() {
        let forecaster = WindowMeanForecaster::new(store_with_years(2018..2021), 7).unwrap();
        let err = forecaster.forecast(date(2025, 1, 28)).unwrap_err();
        assert_eq!(
            err,
            ForecastError::InsufficientHistory {
                month: 1,
                day: 28,
                available: 3,
                required: 7,
            }
        );
        assert!(matches!(
            forecaster.forecast(date(2025, 1, 29)),
            Err(ForecastError::InsufficientHistory { available: 0, .. })
        ));
    }

    #[test]
    fn test_zero_window_is_rejected() {
        assert!(WindowMeanForecaster::new(store_with_years(2018..2021), 0).is_err());
    }

    #[test]
    fn test_table_forecaster_lookup() {
        let features = features();
        let csv = "date,wind,gust,snow\n2025-01-28,12.5,30.0,0.0\n2025-01-30,26.0,41.0,1.0\n";
        let forecaster =
            TableForecaster::from_csv_str(csv, CsvLayout::new(&features, "date")).unwrap();
        assert_eq!(forecaster.len(), 2);
        assert_eq!(
            forecaster.forecast(date(2025, 1, 30)).unwrap(),
            vec![26.0, 41.0, 1.0]
        );
        assert!(matches!(
            forecaster.forecast(date(2025, 1, 29)),
            Err(ForecastError::Service(_))
        ));
    }

    #[test]
    fn test_table_forecaster_rejects_blank_cells() {
        let features = features();
        let csv = "date,wind,gust,snow\n2025-01-28,12.5,,0.0\n";
        let err = TableForecaster::from_csv_str(csv, CsvLayout::new(&features, "date")).unwrap_err();
        assert!(matches!(err, AcrError::Load { .. }));
        assert!(err.to_string().contains("'gust' is blank"));
    }

    struct SlowForecaster(Duration);

    impl Forecaster for SlowForecaster {
        fn forecast(&self, _target: NaiveDate) -> std::result::Result<FeatureVector, ForecastError> {
            thread::sleep(self.0);
            Ok(vec![1.0, 2.0, 3.0])
        }
    }

    #[test]
    fn test_bounded_forecaster_times_out() {
        let forecaster = BoundedForecaster::new(
            SlowForecaster(Duration::from_millis(500)),
            Duration::from_millis(20),
        );
        assert_eq!(
            forecaster.forecast(date(2025, 1, 28)),
            Err(ForecastError::TimedOut(Duration::from_millis(20)))
        );
    }

    #[test]
    fn test_bounded_forecaster_passes_through() {
        let forecaster = BoundedForecaster::new(
            SlowForecaster(Duration::from_millis(1)),
            Duration::from_secs(5),
        );
        assert_eq!(forecaster.forecast(date(2025, 1, 28)).unwrap(), vec![1.0, 2.0, 3.0]);

        let inner = WindowMeanForecaster::new(store_with_years(2018..2021), 7).unwrap();
        let forecaster = BoundedForecaster::new(inner, Duration::from_secs(5));
        assert!(matches!(
            forecaster.forecast(date(2025, 1, 28)),
            Err(ForecastError::InsufficientHistory { .. })
        ));
    }
}
