//! Threshold-exceedance estimation for a single calendar day.
//!
//! Two questions are answered here:
//!
//! * **Historical probability**: across every recorded year, on what share
//!   of the days matching a (month, day) did *at least one* feature exceed
//!   its threshold? A day counts once no matter how many features exceed.
//! * **Forecast breach**: does the forecast vector itself put any feature
//!   above its threshold?
//!
//! Exceedance is strict (`value > threshold`) in both.

use acr_core::threshold::exceeds;
use acr_core::{
    AcrConfig, AcrError, FeatureSet, FeatureVector, HistoricalEntry, HistoricalStore, Result,
    ThresholdPolicy,
};
use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use serde::Serialize;

/// Whether the historical slice for a calendar day had any rows.
///
/// Lets callers tell "no data" apart from "observed, zero risk"; both
/// carry a probability of 0.0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistoryCoverage {
    Observed,
    NoData,
}

/// Historical exceedance statistics for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalExceedance {
    pub month: u32,
    pub day: u32,
    /// Entries recorded on this (month, day) across all years.
    pub matching_days: usize,
    /// Entries on which any feature exceeded its threshold.
    pub cancellation_days: usize,
    /// `cancellation_days / matching_days * 100`, or 0.0 with no data.
    pub probability: f64,
    pub coverage: HistoryCoverage,
}

/// Cancellation percentage for `cancellation_days` out of `matching_days`.
pub fn cancellation_probability(cancellation_days: usize, matching_days: usize) -> f64 {
    if matching_days == 0 {
        return 0.0;
    }
    cancellation_days as f64 * 100.0 / matching_days as f64
}

/// The combined single-day result: forecast, historical probability and
/// breach flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyAssessment {
    pub date: NaiveDate,
    pub forecast: Option<FeatureVector>,
    pub historical: HistoricalExceedance,
    /// `None` when there is no forecast to judge.
    pub breach: Option<bool>,
}

impl DailyAssessment {
    pub fn probability(&self) -> f64 {
        self.historical.probability
    }

    pub fn has_history(&self) -> bool {
        self.historical.coverage == HistoryCoverage::Observed
    }

    /// Human-readable verdict on the forecast, if there is one.
    pub fn advisory(&self) -> Option<&'static str> {
        self.breach.map(|breach| {
            if breach {
                "forecast exceeds at least one cancellation threshold: cancellation risk is high"
            } else {
                "forecast is below every cancellation threshold: cancellation risk is low"
            }
        })
    }
}

/// Estimates cancellation risk from a historical store and threshold policy.
///
/// Construction checks that every feature has both a threshold and a
/// historical column, so estimation itself cannot fail on configuration.
#[derive(Debug, Clone)]
pub struct ExceedanceEstimator<'a> {
    features: &'a FeatureSet,
    thresholds: Vec<f64>,
    columns: Vec<usize>,
    store: &'a HistoricalStore,
}

impl<'a> ExceedanceEstimator<'a> {
    pub fn new(
        features: &'a FeatureSet,
        policy: &ThresholdPolicy,
        store: &'a HistoricalStore,
    ) -> Result<Self> {
        if features.is_empty() {
            return Err(AcrError::configuration("feature set is empty"));
        }
        let thresholds = policy.resolve(features)?;
        let columns = features
            .iter()
            .map(|feature| {
                store.features().index_of(feature).ok_or_else(|| {
                    AcrError::configuration(format!(
                        "historical record has no column for feature '{feature}'"
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;
        Ok(ExceedanceEstimator {
            features,
            thresholds,
            columns,
            store,
        })
    }

    pub fn from_config(config: &'a AcrConfig, store: &'a HistoricalStore) -> Result<Self> {
        Self::new(&config.features, &config.thresholds, store)
    }

    pub fn features(&self) -> &'a FeatureSet {
        self.features
    }

    /// Thresholds in feature-set order.
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn store(&self) -> &'a HistoricalStore {
        self.store
    }

    /// Whether feature `index` exceeded its threshold on `entry`.
    pub(crate) fn entry_exceeds(&self, entry: &HistoricalEntry, index: usize) -> bool {
        entry
            .value(self.columns[index])
            .is_some_and(|value| exceeds(value, self.thresholds[index]))
    }

    /// Whether any feature exceeded its threshold on `entry`.
    pub fn is_cancellation_day(&self, entry: &HistoricalEntry) -> bool {
        (0..self.features.len()).any(|index| self.entry_exceeds(entry, index))
    }

    /// Share of recorded `month`/`day` entries on which any feature
    /// exceeded its threshold.
    pub fn historical_exceedance(&self, month: u32, day: u32) -> HistoricalExceedance {
        let slice = self.store.slice(month, day);
        if slice.is_empty() {
            warn!("no historical data for {}/{}", month, day);
            return HistoricalExceedance {
                month,
                day,
                matching_days: 0,
                cancellation_days: 0,
                probability: 0.0,
                coverage: HistoryCoverage::NoData,
            };
        }

        let cancellation_days = slice
            .iter()
            .filter(|entry| self.is_cancellation_day(entry))
            .count();
        let probability = cancellation_probability(cancellation_days, slice.len());
        debug!(
            "{}/{}: {} of {} recorded days exceeded a threshold",
            month,
            day,
            cancellation_days,
            slice.len()
        );
        HistoricalExceedance {
            month,
            day,
            matching_days: slice.len(),
            cancellation_days,
            probability,
            coverage: HistoryCoverage::Observed,
        }
    }

    /// True when any forecast value is strictly above its threshold.
    pub fn forecast_breach(&self, forecast: &[f64]) -> Result<bool> {
        self.features.check_vector(forecast)?;
        Ok(forecast
            .iter()
            .zip(&self.thresholds)
            .any(|(&value, &threshold)| exceeds(value, threshold)))
    }

    /// Assess `date` with an optional forecast.
    pub fn assess(&self, date: NaiveDate, forecast: Option<&[f64]>) -> Result<DailyAssessment> {
        let breach = forecast.map(|f| self.forecast_breach(f)).transpose()?;
        Ok(DailyAssessment {
            date,
            forecast: forecast.map(<[f64]>::to_vec),
            historical: self.historical_exceedance(date.month(), date.day()),
            breach,
        })
    }
}
