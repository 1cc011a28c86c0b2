//! Conditional volatility forecast.

use serde::{Deserialize, Serialize};

/// Per-day conditional standard deviation, aligned with the daily changes it
/// was fitted on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolatilityForecast {
    values: Vec<f64>,
}

impl VolatilityForecast {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl From<Vec<f64>> for VolatilityForecast {
    fn from(values: Vec<f64>) -> Self {
        Self::new(values)
    }
}
