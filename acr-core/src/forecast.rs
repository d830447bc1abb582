//! The forecaster capability.
//!
//! A forecaster turns a target date into one predicted value per feature.
//! How it does so (an LSTM over scaled windows, a lookup table, a baseline
//! average) is invisible to the estimator and the aggregator.

use crate::feature::FeatureVector;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Why no forecast is available for a date.
///
/// All variants are local to one date: the multi-day aggregator records an
/// absent day and moves on.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub enum ForecastError {
    /// Fewer historical rows exist for the calendar day than the model's
    /// input window needs.
    #[error("insufficient history for {month}/{day}: {available} of {required} rows")]
    InsufficientHistory {
        month: u32,
        day: u32,
        available: usize,
        required: usize,
    },

    /// The forecaster returned a vector that does not match the feature set.
    #[error("forecast has {actual} values but the feature set has {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("forecast timed out after {0:?}")]
    TimedOut(Duration),

    #[error("forecast service error: {0}")]
    Service(String),
}

pub trait Forecaster {
    /// Predict the feature vector for `target`, in feature-set order.
    fn forecast(&self, target: NaiveDate) -> Result<FeatureVector, ForecastError>;
}

impl<F: Forecaster + ?Sized> Forecaster for &F {
    fn forecast(&self, target: NaiveDate) -> Result<FeatureVector, ForecastError> {
        (**self).forecast(target)
    }
}

impl<F: Forecaster + ?Sized> Forecaster for Box<F> {
    fn forecast(&self, target: NaiveDate) -> Result<FeatureVector, ForecastError> {
        (**self).forecast(target)
    }
}

impl<F: Forecaster + ?Sized> Forecaster for Arc<F> {
    fn forecast(&self, target: NaiveDate) -> Result<FeatureVector, ForecastError> {
        (**self).forecast(target)
    }
}
