//! Per-feature comparison of a forecast against thresholds and history.
//!
//! Unlike [`ExceedanceEstimator::historical_exceedance`], which counts a
//! day once if *any* feature exceeded, the counts here are per feature:
//! how many recorded days did *this* feature alone go above *its own*
//! threshold. A row's count is therefore never larger than the day-level
//! cancellation count for the same calendar day.

use crate::estimator::ExceedanceEstimator;
use acr_core::Result;
use acr_utils::rounding::round_to;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// One feature's forecast compared with its threshold and its history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureReportRow {
    pub feature: String,
    pub predicted: f64,
    pub threshold: f64,
    /// `predicted / threshold * 100`, or 0.0 when the threshold is 0.
    pub percent_of_threshold: f64,
    /// Recorded days on this calendar day where this feature exceeded
    /// its own threshold.
    pub historical_exceedances: usize,
}

impl FeatureReportRow {
    /// Predicted value rounded to 2 decimal places.
    pub fn display_predicted(&self) -> f64 {
        round_to(self.predicted, 2)
    }

    /// Percentage of threshold rounded to 1 decimal place.
    pub fn display_percent(&self) -> f64 {
        round_to(self.percent_of_threshold, 1)
    }
}

/// Per-feature report for one date, rows in feature-set order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureReport {
    pub date: NaiveDate,
    /// Size of the historical slice the counts were taken from.
    pub historical_days: usize,
    pub rows: Vec<FeatureReportRow>,
}

pub fn percent_of_threshold(predicted: f64, threshold: f64) -> f64 {
    if threshold == 0.0 {
        return 0.0;
    }
    predicted / threshold * 100.0
}

impl<'a> ExceedanceEstimator<'a> {
    /// Build the per-feature report for `forecast` on `date`.
    pub fn feature_report(&self, date: NaiveDate, forecast: &[f64]) -> Result<FeatureReport> {
        self.features().check_vector(forecast)?;
        let slice = self.store().slice(date.month(), date.day());
        let rows = self
            .features()
            .iter()
            .zip(forecast)
            .zip(self.thresholds())
            .enumerate()
            .map(|(index, ((feature, &predicted), &threshold))| FeatureReportRow {
                feature: feature.to_string(),
                predicted,
                threshold,
                percent_of_threshold: percent_of_threshold(predicted, threshold),
                historical_exceedances: slice
                    .iter()
                    .filter(|entry| self.entry_exceeds(entry, index))
                    .count(),
            })
            .collect();
        Ok(FeatureReport {
            date,
            historical_days: slice.len(),
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::tests::{
        date, exceeds_any, features, policy, policy_from, store, store_from,
    };
    use acr_core::{AcrError, FeatureSet, HistoricalEntry, HistoricalStore, ThresholdPolicy};
    use proptest::collection::vec;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_feature_counts_bounded_by_cancellation_days(
            thresholds in vec(0u8..20, 3),
            rows in vec(vec(0u8..20, 3), 0..30),
            forecast in vec(0.0..40.0_f64, 3),
        ) {
            let features = features();
            let store = store_from(&rows);
            let policy = policy_from(&thresholds);
            let estimator = ExceedanceEstimator::new(&features, &policy, &store).unwrap();
            let report = estimator.feature_report(date(2025, 1, 28), &forecast).unwrap();
            let cancellation_days = estimator.historical_exceedance(1, 28).cancellation_days;

            let counts: Vec<usize> =
                report.rows.iter().map(|r| r.historical_exceedances).collect();
            for (index, &count) in counts.iter().enumerate() {
                prop_assert!(count <= cancellation_days);
                let expected = rows.iter().filter(|row| row[index] > thresholds[index]).count();
                prop_assert_eq!(count, expected);
            }
            prop_assert!(cancellation_days <= counts.iter().sum::<usize>());
            prop_assert_eq!(
                cancellation_days,
                rows.iter().filter(|row| exceeds_any(row, &thresholds)).count()
            );
        }
    }

    #[test]
    fn test_rows_follow_feature_order() {
        let features = features();
        let store = store();
        let estimator = ExceedanceEstimator::new(&features, &policy(), &store).unwrap();
        let report = estimator
            .feature_report(date(2025, 1, 28), &[12.5, 17.5, 0.0])
            .unwrap();
        let names: Vec<&str> = report.rows.iter().map(|r| r.feature.as_str()).collect();
        assert_eq!(names, vec!["wind", "gust", "snow"]);
        assert_eq!(report.historical_days, 10);
        assert_eq!(report.rows[0].percent_of_threshold, 50.0);
        assert_eq!(report.rows[1].percent_of_threshold, 50.0);
        assert_eq!(report.rows[2].threshold, 5.0);
    }

    #[test]
    fn test_counts_are_per_feature() {
        let features = features();
        let store = store();
        let estimator = ExceedanceEstimator::new(&features, &policy(), &store).unwrap();
        let report = estimator
            .feature_report(date(2025, 1, 28), &[0.0, 0.0, 0.0])
            .unwrap();
        let counts: Vec<usize> = report.rows.iter().map(|r| r.historical_exceedances).collect();
        // wind: 2016; gust: 2016, 2021; snow: 2019
        assert_eq!(counts, vec![1, 2, 1]);
    }

    #[test]
    fn test_counts_never_exceed_cancellation_days() {
        let features = features();
        let store = store();
        let estimator = ExceedanceEstimator::new(&features, &policy(), &store).unwrap();
        for (month, day) in [(1, 28), (1, 29), (2, 1)] {
            let target = date(2025, month, day);
            let report = estimator.feature_report(target, &[1.0, 1.0, 1.0]).unwrap();
            let historical = estimator.historical_exceedance(month, day);
            for row in &report.rows {
                assert!(row.historical_exceedances <= historical.cancellation_days);
            }
        }
    }

    #[test]
    fn test_zero_threshold_gives_zero_percent() {
        let features = FeatureSet::new(["snow"]).unwrap();
        let store = HistoricalStore::new(
            features.clone(),
            vec![HistoricalEntry::new(date(2020, 12, 1), vec![0.5])],
        )
        .unwrap();
        let policy = ThresholdPolicy::new().with("snow", 0.0);
        let estimator = ExceedanceEstimator::new(&features, &policy, &store).unwrap();
        let report = estimator.feature_report(date(2025, 12, 1), &[3.0]).unwrap();
        assert_eq!(report.rows[0].percent_of_threshold, 0.0);
        assert_eq!(report.rows[0].historical_exceedances, 1);
    }

    #[test]
    fn test_display_rounding_keeps_full_precision() {
        let features = features();
        let store = store();
        let estimator = ExceedanceEstimator::new(&features, &policy(), &store).unwrap();
        let report = estimator
            .feature_report(date(2025, 1, 28), &[10.126, 0.0, 0.0])
            .unwrap();
        let row = &report.rows[0];
        assert_eq!(row.predicted, 10.126);
        assert_eq!(row.display_predicted(), 10.13);
        assert_eq!(row.display_percent(), 40.5);
    }

    #[test]
    fn test_wrong_length_forecast_is_rejected() {
        let features = features();
        let store = store();
        let estimator = ExceedanceEstimator::new(&features, &policy(), &store).unwrap();
        assert!(matches!(
            estimator.feature_report(date(2025, 1, 28), &[1.0]),
            Err(AcrError::ForecastShape { .. })
        ));
    }
}
