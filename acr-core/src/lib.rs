//! Core types for estimating flight-cancellation risk at an airport.
//!
//! Everything here is plain data: the ordered [`FeatureSet`], the
//! [`ThresholdPolicy`], the immutable [`HistoricalStore`] of daily weather
//! observations, the [`Forecaster`] capability and the startup
//! [`AcrConfig`]. The estimation and aggregation logic lives in `acr-data`.

pub mod config;
pub mod date_range;
pub mod error;
pub mod feature;
pub mod forecast;
pub mod history;
mod loader;
pub mod threshold;

pub use config::{AcrConfig, AirportConfig};
pub use date_range::DateRange;
pub use error::{AcrError, Result};
pub use feature::{FeatureSet, FeatureVector};
pub use forecast::{ForecastError, Forecaster};
pub use history::{HistoricalEntry, HistoricalSlice, HistoricalStore};
pub use loader::{BlankCell, CsvLayout};
pub use threshold::ThresholdPolicy;
