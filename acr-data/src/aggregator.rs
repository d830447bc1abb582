//! Multi-day aggregation: repeated single-day assessment over a span of
//! consecutive calendar days.
//!
//! A day whose forecast is unavailable becomes an explicit gap (`None`) in
//! every derived series; it never aborts the span and is never filled with
//! a fabricated zero.

use crate::chart::ProbabilityChart;
use crate::estimator::{DailyAssessment, ExceedanceEstimator};
use crate::report::FeatureReport;
use acr_core::{AcrError, DateRange, FeatureSet, ForecastError, Forecaster, Result};
use acr_utils::dates::month_day_label;
use acr_utils::rounding::round_opt;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

/// Label of the synthetic probability row appended to the span matrix.
pub const PROBABILITY_ROW_LABEL: &str = "cancellation_probability_pct";

/// The result for one date of a span.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DayOutcome {
    Assessed {
        assessment: DailyAssessment,
        report: FeatureReport,
    },
    Unavailable {
        date: NaiveDate,
        reason: ForecastError,
    },
}

impl DayOutcome {
    pub fn date(&self) -> NaiveDate {
        match self {
            DayOutcome::Assessed { assessment, .. } => assessment.date,
            DayOutcome::Unavailable { date, .. } => *date,
        }
    }

    pub fn assessment(&self) -> Option<&DailyAssessment> {
        match self {
            DayOutcome::Assessed { assessment, .. } => Some(assessment),
            DayOutcome::Unavailable { .. } => None,
        }
    }

    pub fn report(&self) -> Option<&FeatureReport> {
        match self {
            DayOutcome::Assessed { report, .. } => Some(report),
            DayOutcome::Unavailable { .. } => None,
        }
    }

    pub fn forecast(&self) -> Option<&[f64]> {
        self.assessment()
            .and_then(|assessment| assessment.forecast.as_deref())
    }

    /// Historical probability, `None` for an unavailable day.
    pub fn probability(&self) -> Option<f64> {
        self.assessment().map(DailyAssessment::probability)
    }
}

/// One labelled row of the span matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub label: String,
    pub values: Vec<Option<f64>>,
}

/// Feature × date table: one row per feature plus the probability row,
/// one column per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanMatrix {
    pub column_labels: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

/// Everything computed for a span of consecutive dates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanReport {
    pub features: FeatureSet,
    pub days: Vec<DayOutcome>,
}

impl SpanReport {
    /// "M/D" labels, one per date.
    pub fn column_labels(&self) -> Vec<String> {
        self.days
            .iter()
            .map(|day| month_day_label(&day.date()))
            .collect()
    }

    pub fn available_days(&self) -> usize {
        self.days
            .iter()
            .filter(|day| day.assessment().is_some())
            .count()
    }

    /// Full-precision probability per date.
    pub fn probability_series(&self) -> Vec<Option<f64>> {
        self.days.iter().map(DayOutcome::probability).collect()
    }

    /// Presentation matrix: forecasts rounded to 2 decimal places,
    /// probabilities to 1.
    pub fn matrix(&self) -> SpanMatrix {
        let mut rows: Vec<MatrixRow> = self
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| MatrixRow {
                label: feature.to_string(),
                values: self
                    .days
                    .iter()
                    .map(|day| round_opt(day.forecast().and_then(|f| f.get(index).copied()), 2))
                    .collect(),
            })
            .collect();
        rows.push(MatrixRow {
            label: PROBABILITY_ROW_LABEL.to_string(),
            values: self.rounded_probabilities(),
        });
        SpanMatrix {
            column_labels: self.column_labels(),
            rows,
        }
    }

    /// Probability line chart with the y-axis scaled to the rounded series.
    pub fn chart(&self) -> ProbabilityChart {
        ProbabilityChart::new(self.column_labels(), self.rounded_probabilities())
    }

    fn rounded_probabilities(&self) -> Vec<Option<f64>> {
        self.probability_series()
            .into_iter()
            .map(|p| round_opt(p, 1))
            .collect()
    }
}

/// Drives a forecaster and an estimator over single days or spans.
pub struct SpanAggregator<'e, 'a, F> {
    estimator: &'e ExceedanceEstimator<'a>,
    forecaster: F,
}

impl<'e, 'a, F: Forecaster> SpanAggregator<'e, 'a, F> {
    pub fn new(estimator: &'e ExceedanceEstimator<'a>, forecaster: F) -> Self {
        SpanAggregator {
            estimator,
            forecaster,
        }
    }

    /// Forecast and assess a single date. Forecast failures become
    /// [`DayOutcome::Unavailable`].
    pub fn assess_day(&self, date: NaiveDate) -> DayOutcome {
        match self.try_assess_day(date) {
            Ok(outcome) => outcome,
            Err(reason) => {
                warn!("no forecast for {}: {}", date, reason);
                DayOutcome::Unavailable { date, reason }
            }
        }
    }

    fn try_assess_day(&self, date: NaiveDate) -> std::result::Result<DayOutcome, ForecastError> {
        let forecast = self.forecaster.forecast(date)?;
        let shape_mismatch = |e: AcrError| match e {
            AcrError::ForecastShape { expected, actual } => {
                ForecastError::ShapeMismatch { expected, actual }
            }
            other => ForecastError::Service(other.to_string()),
        };
        let assessment = self
            .estimator
            .assess(date, Some(&forecast))
            .map_err(shape_mismatch)?;
        let report = self
            .estimator
            .feature_report(date, &forecast)
            .map_err(shape_mismatch)?;
        Ok(DayOutcome::Assessed { assessment, report })
    }

    /// Assess `span` consecutive days starting at `start`.
    ///
    /// Only an invalid span is an error; per-day failures are recorded in
    /// the returned report.
    pub fn run(&self, start: NaiveDate, span: usize) -> Result<SpanReport> {
        let dates = DateRange::from_span(start, span).ok_or_else(|| {
            AcrError::configuration(format!("span of {span} days from {start} is not valid"))
        })?;
        info!("assessing {} days starting {}", span, start);
        let days: Vec<DayOutcome> = dates.map(|date| self.assess_day(date)).collect();
        let report = SpanReport {
            features: self.estimator.features().clone(),
            days,
        };
        info!(
            "span complete: {} of {} days assessed",
            report.available_days(),
            span
        );
        Ok(report)
    }
}
