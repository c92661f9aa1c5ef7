//! Metric weight vector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RankerError;

/// Metric name → non-negative weight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct WeightVector {
    weights: BTreeMap<String, f64>,
}

impl WeightVector {
    /// Build from a map, rejecting negative or non-finite weights.
    pub fn new(weights: BTreeMap<String, f64>) -> Result<Self, RankerError> {
        for (metric, &weight) in &weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RankerError::InvalidWeight { metric: metric.clone(), weight });
            }
        }
        Ok(Self { weights })
    }

    /// Equal weight for every named metric.
    pub fn uniform<'a>(metrics: impl IntoIterator<Item = &'a str>) -> Self {
        let weights = metrics.into_iter().map(|m| (m.to_string(), 1.0)).collect();
        Self { weights }
    }

    pub fn with(mut self, metric: &str, weight: f64) -> Result<Self, RankerError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(RankerError::InvalidWeight { metric: metric.to_string(), weight });
        }
        self.weights.insert(metric.to_string(), weight);
        Ok(self)
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.weights.get(metric).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.weights.iter().map(|(m, w)| (m.as_str(), *w))
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

impl TryFrom<BTreeMap<String, f64>> for WeightVector {
    type Error = RankerError;

    fn try_from(weights: BTreeMap<String, f64>) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<WeightVector> for BTreeMap<String, f64> {
    fn from(w: WeightVector) -> Self {
        w.weights
    }
}
