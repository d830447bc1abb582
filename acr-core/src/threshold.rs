//! Per-feature cancellation thresholds.
//!
//! A feature "exceeds" its threshold only when its value is strictly
//! greater than the threshold; a value equal to the threshold never counts.

use crate::error::{AcrError, Result};
use crate::feature::FeatureSet;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returns true when `value` is strictly above `threshold`.
pub fn exceeds(value: f64, threshold: f64) -> bool {
    value > threshold
}

/// Mapping from feature name to the value above which that feature alone
/// is considered cancellation-triggering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThresholdPolicy(BTreeMap<String, f64>);

impl ThresholdPolicy {
    pub fn new() -> Self {
        ThresholdPolicy(BTreeMap::new())
    }

    /// Builder-style insert.
    pub fn with(mut self, feature: impl Into<String>, threshold: f64) -> Self {
        self.insert(feature, threshold);
        self
    }

    pub fn insert(&mut self, feature: impl Into<String>, threshold: f64) {
        self.0.insert(feature.into(), threshold);
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.0.get(feature).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Resolve thresholds positionally against `features`.
    ///
    /// Every feature must have a finite, non-negative threshold. Policy
    /// entries naming no feature are ignored with a warning.
    pub fn resolve(&self, features: &FeatureSet) -> Result<Vec<f64>> {
        let mut resolved = Vec::with_capacity(features.len());
        for feature in features.iter() {
            let threshold = self.get(feature).ok_or_else(|| {
                AcrError::configuration(format!("no threshold configured for feature '{feature}'"))
            })?;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(AcrError::configuration(format!(
                    "threshold for '{feature}' must be a non-negative number, got {threshold}"
                )));
            }
            resolved.push(threshold);
        }
        for name in self.0.keys() {
            if features.index_of(name).is_none() {
                warn!("threshold for '{}' has no matching feature and is ignored", name);
            }
        }
        Ok(resolved)
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ThresholdPolicy {
    fn from_iter<T: IntoIterator<Item = (S, f64)>>(iter: T) -> Self {
        ThresholdPolicy(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
