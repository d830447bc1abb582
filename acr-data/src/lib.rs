//! Cancellation-risk estimation and reporting.
//!
//! [`ExceedanceEstimator`] answers the single-day questions (historical
//! probability, forecast breach, per-feature report). [`SpanAggregator`]
//! repeats that over consecutive dates and shapes the results into a
//! table and a chart series. Rendering is left to the caller.

pub mod aggregator;
pub mod chart;
pub mod estimator;
pub mod forecasters;
pub mod report;

pub use aggregator::{DayOutcome, MatrixRow, SpanAggregator, SpanMatrix, SpanReport};
pub use chart::{y_axis_upper_bound, ProbabilityChart};
pub use estimator::{DailyAssessment, ExceedanceEstimator, HistoricalExceedance, HistoryCoverage};
pub use forecasters::{BoundedForecaster, TableForecaster, WindowMeanForecaster};
pub use report::{FeatureReport, FeatureReportRow};
