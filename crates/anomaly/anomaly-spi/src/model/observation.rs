//! Price observations and the validated time series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, Result};

/// A single (timestamp, price) point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub price: f64,
}

impl Observation {
    pub fn new(timestamp: NaiveDateTime, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Chronologically ordered price series.
///
/// Construction enforces the invariants every later stage relies on: at
/// least two points, finite prices, strictly increasing timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    observations: Vec<Observation>,
}

impl TimeSeries {
    /// Minimum number of observations needed to compute one daily change.
    pub const MIN_OBSERVATIONS: usize = 2;

    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if observations.len() < Self::MIN_OBSERVATIONS {
            return Err(AnomalyError::InvalidInput(format!(
                "not enough price data to compute daily changes: need at least {}, got {}",
                Self::MIN_OBSERVATIONS,
                observations.len()
            )));
        }

        if let Some((i, obs)) = observations
            .iter()
            .enumerate()
            .find(|(_, obs)| !obs.price.is_finite())
        {
            return Err(AnomalyError::InvalidInput(format!(
                "price at index {} is not finite: {}",
                i, obs.price
            )));
        }

        if let Some(i) = observations
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(AnomalyError::InvalidInput(format!(
                "timestamps must be strictly increasing: {} at index {} follows {}",
                observations[i + 1].timestamp,
                i + 1,
                observations[i].timestamp
            )));
        }

        Ok(Self { observations })
    }

    /// Build from parallel timestamp and price vectors.
    pub fn from_parts(timestamps: Vec<NaiveDateTime>, prices: Vec<f64>) -> Result<Self> {
        if timestamps.len() != prices.len() {
            return Err(AnomalyError::InvalidInput(format!(
                "length mismatch: {} timestamps, {} prices",
                timestamps.len(),
                prices.len()
            )));
        }
        let observations = timestamps
            .into_iter()
            .zip(prices)
            .map(|(timestamp, price)| Observation::new(timestamp, price))
            .collect();
        Self::new(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false; kept alongside `len` for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.observations[0].timestamp
    }

    /// Latest observed timestamp (the series is sorted, so this is the max).
    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.observations[self.observations.len() - 1].timestamp
    }

    /// `price[i + 1] - price[i]` for every consecutive pair.
    pub fn daily_changes(&self) -> Vec<f64> {
        self.observations
            .windows(2)
            .map(|w| w[1].price - w[0].price)
            .collect()
    }

    /// Dates the daily changes were realized on, aligned with [`daily_changes`].
    ///
    /// [`daily_changes`]: TimeSeries::daily_changes
    pub fn change_dates(&self) -> Vec<NaiveDateTime> {
        self.observations[1..].iter().map(|o| o.timestamp).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_daily_changes_aligned_with_later_date() {
        let series =
            TimeSeries::from_parts(vec![day(1), day(2), day(4)], vec![10.0, 12.5, 11.0]).unwrap();

        assert_eq!(series.daily_changes(), vec![2.5, -1.5]);
        assert_eq!(series.change_dates(), vec![day(2), day(4)]);
        assert_eq!(series.last_timestamp(), day(4));
        assert_eq!(series.first_timestamp(), day(1));
    }

    #[test]
    fn test_single_point_rejected() {
        let err = TimeSeries::from_parts(vec![day(1)], vec![10.0]).unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidInput(_)));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let err = TimeSeries::from_parts(vec![day(1), day(2)], vec![10.0]).unwrap_err();
        assert!(err.to_string().contains("length mismatch"));
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let err = TimeSeries::from_parts(vec![day(1), day(1)], vec![10.0, 11.0]).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn test_unordered_timestamps_rejected() {
        let err = TimeSeries::from_parts(vec![day(3), day(2)], vec![10.0, 11.0]).unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidInput(_)));
    }

    #[test]
    fn test_non_finite_price_rejected() {
        let err =
            TimeSeries::from_parts(vec![day(1), day(2)], vec![10.0, f64::NAN]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }
}
