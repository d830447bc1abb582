use crate::error::{AcrError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One predicted or observed value per feature, in [`FeatureSet`] order.
pub type FeatureVector = Vec<f64>;

/// The ordered list of weather metrics tracked for cancellation risk.
///
/// Order is significant: forecast vectors, historical columns and
/// threshold lookups all align positionally with this sequence. A feature
/// set is never empty and never contains the same name twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSet(pub(crate) Vec<String>);

impl FeatureSet {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(AcrError::configuration("feature set is empty"));
        }
        let mut seen = HashSet::new();
        for name in &names {
            if name.trim().is_empty() {
                return Err(AcrError::configuration("feature name is blank"));
            }
            if !seen.insert(name.as_str()) {
                return Err(AcrError::configuration(format!(
                    "feature '{name}' is listed more than once"
                )));
            }
        }
        Ok(FeatureSet(names))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a constructed set; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n == name)
    }

    /// Check that a vector has exactly one value per feature.
    pub fn check_vector(&self, values: &[f64]) -> Result<()> {
        if values.len() != self.len() {
            return Err(AcrError::ForecastShape {
                expected: self.len(),
                actual: values.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<Vec<String>> for FeatureSet {
    type Error = AcrError;

    fn try_from(value: Vec<String>) -> Result<Self> {
        FeatureSet::new(value)
    }
}

impl From<FeatureSet> for Vec<String> {
    fn from(value: FeatureSet) -> Self {
        value.0
    }
}
