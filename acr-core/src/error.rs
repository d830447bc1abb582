use thiserror::Error;

/// Errors raised while configuring or loading the estimator inputs.
///
/// Per-day forecast failures are not errors at this level; they are
/// reported as [`crate::ForecastError`] and become absent days.
#[derive(Debug, Error)]
pub enum AcrError {
    /// Feature set, threshold policy, window or span are inconsistent.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("forecast has {actual} values but the feature set has {expected}")]
    ForecastShape { expected: usize, actual: usize },

    #[error("failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AcrError {
    pub fn configuration(message: impl Into<String>) -> Self {
        AcrError::Configuration(message.into())
    }
}

pub type Result<T> = std::result::Result<T, AcrError>;
