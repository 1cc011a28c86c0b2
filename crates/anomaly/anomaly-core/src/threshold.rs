//! Threshold tests that flag individual unusual days.

use anomaly_api::{DetectionConfig, TestPolicy};
use anomaly_spi::{AnomalyError, Result, UnusualDayDetector, UnusualDayMask, VolatilityForecast};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, warn};

use crate::stats;

/// Two-tailed standard-normal critical value `Φ⁻¹(1 - confidence_level / 2)`.
pub fn critical_value(confidence_level: f64) -> Result<f64> {
    if !(confidence_level.is_finite() && confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(AnomalyError::invalid_parameter(
            "confidence_level",
            format!("must lie in (0, 1), got {}", confidence_level),
        ));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AnomalyError::invalid_parameter("normal distribution", e.to_string()))?;
    Ok(normal.inverse_cdf(1.0 - confidence_level / 2.0))
}

/// Flags days whose change is improbable under the volatility forecast.
///
/// With [`TestPolicy::Combined`] a day must also fail a plain z-test on the
/// standardized change. When that conjunction flags nothing but the
/// volatility test alone flags something, the volatility-only mask is
/// returned instead.
#[derive(Debug, Clone)]
pub struct ThresholdDetector {
    confidence_level: f64,
    policy: TestPolicy,
    critical: f64,
}

impl ThresholdDetector {
    pub fn new(confidence_level: f64, policy: TestPolicy) -> Result<Self> {
        Ok(Self {
            confidence_level,
            policy,
            critical: critical_value(confidence_level)?,
        })
    }

    pub fn from_config(config: &DetectionConfig) -> Result<Self> {
        Self::new(config.confidence_level, config.test_policy)
    }

    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    pub fn critical_value(&self) -> f64 {
        self.critical
    }

    pub fn policy(&self) -> TestPolicy {
        self.policy
    }

    fn volatility_test(&self, daily_changes: &[f64], forecast: &[f64]) -> Vec<bool> {
        daily_changes
            .iter()
            .zip(forecast)
            .map(|(change, vol)| change.abs() > self.critical * vol)
            .collect()
    }

    fn standardized_test(&self, daily_changes: &[f64]) -> Vec<bool> {
        let mean = stats::mean(daily_changes);
        let std_dev = stats::std_dev(daily_changes);
        if std_dev == 0.0 {
            return vec![false; daily_changes.len()];
        }
        daily_changes
            .iter()
            .map(|change| (change - mean).abs() / std_dev > self.critical)
            .collect()
    }
}

impl UnusualDayDetector for ThresholdDetector {
    fn detect(
        &self,
        daily_changes: &[f64],
        forecast: &VolatilityForecast,
    ) -> Result<UnusualDayMask> {
        if daily_changes.len() != forecast.len() {
            return Err(AnomalyError::InvalidInput(format!(
                "forecast length {} does not match {} daily changes",
                forecast.len(),
                daily_changes.len()
            )));
        }

        let primary = self.volatility_test(daily_changes, forecast.values());

        let flags = match self.policy {
            TestPolicy::VolatilityOnly => primary,
            TestPolicy::Combined => {
                let secondary = self.standardized_test(daily_changes);
                let combined: Vec<bool> = primary
                    .iter()
                    .zip(&secondary)
                    .map(|(a, b)| *a && *b)
                    .collect();

                if !combined.iter().any(|&x| x) && primary.iter().any(|&x| x) {
                    warn!(
                        confidence_level = self.confidence_level,
                        "combined test flagged nothing; falling back to volatility test"
                    );
                    primary
                } else {
                    combined
                }
            }
        };

        let mask = UnusualDayMask::new(flags, self.critical);
        debug!(
            critical_value = self.critical,
            flagged = mask.count(),
            "threshold test applied"
        );
        Ok(mask)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_critical_values() {
        assert!((critical_value(0.05).unwrap() - 1.959_964).abs() < 1e-5);
        assert!((critical_value(0.01).unwrap() - 2.575_829).abs() < 1e-5);
        assert!((critical_value(0.001).unwrap() - 3.290_527).abs() < 1e-5);
        assert!(critical_value(0.5).unwrap() > 0.67 && critical_value(0.5).unwrap() < 0.68);
    }

    #[test]
    fn test_critical_value_rejects_out_of_range() {
        assert!(critical_value(0.0).is_err());
        assert!(critical_value(1.0).is_err());
        assert!(critical_value(f64::NAN).is_err());
    }

    #[test]
    fn test_smaller_level_gives_larger_z() {
        let z_loose = critical_value(0.10).unwrap();
        let z_strict = critical_value(0.01).unwrap();
        assert!(z_strict > z_loose);
    }

    #[test]
    fn test_volatility_only_mask() {
        let detector = ThresholdDetector::new(0.05, TestPolicy::VolatilityOnly).unwrap();
        let changes = [0.5, -3.0, 1.0, 2.5];
        let forecast = VolatilityForecast::new(vec![1.0, 1.0, 1.0, 1.0]);

        let mask = detector.detect(&changes, &forecast).unwrap();
        assert_eq!(mask.flags, vec![false, true, false, true]);
        assert_eq!(mask.critical_value, detector.critical_value());
    }

    #[test]
    fn test_forecast_scales_threshold() {
        let detector = ThresholdDetector::new(0.05, TestPolicy::VolatilityOnly).unwrap();
        let changes = [3.0, 3.0];
        let forecast = VolatilityForecast::new(vec![1.0, 2.0]);

        let mask = detector.detect(&changes, &forecast).unwrap();
        assert_eq!(mask.flags, vec![true, false]);
    }

    #[test]
    fn test_combined_requires_both_tests() {
        let detector = ThresholdDetector::new(0.05, TestPolicy::Combined).unwrap();
        let mut changes = vec![0.1; 20];
        changes[5] = 10.0;
        changes[12] = 0.5;
        // Tiny volatility: both 10.0 and 0.5 pass the volatility test, only
        // 10.0 is extreme relative to the whole sample.
        let forecast = VolatilityForecast::new(vec![0.06; 20]);

        let mask = detector.detect(&changes, &forecast).unwrap();
        assert_eq!(mask.indices(), vec![5]);
    }

    #[test]
    fn test_combined_falls_back_to_volatility_test() {
        let detector = ThresholdDetector::new(0.05, TestPolicy::Combined).unwrap();
        // Evenly spread changes: nothing is extreme relative to the sample,
        // but the forecast is tight enough to flag the larger moves.
        let changes = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let forecast = VolatilityForecast::new(vec![0.1; 6]);

        let mask = detector.detect(&changes, &forecast).unwrap();
        assert_eq!(mask.count(), 6);
    }

    #[test]
    fn test_nothing_flagged_returns_clear_mask() {
        let detector = ThresholdDetector::new(0.05, TestPolicy::Combined).unwrap();
        let changes = [0.1, -0.1, 0.2];
        let forecast = VolatilityForecast::new(vec![5.0; 3]);

        let mask = detector.detect(&changes, &forecast).unwrap();
        assert!(mask.is_clear());
    }

    #[test]
    fn test_length_mismatch() {
        let detector = ThresholdDetector::new(0.05, TestPolicy::VolatilityOnly).unwrap();
        let forecast = VolatilityForecast::new(vec![1.0]);
        assert!(detector.detect(&[1.0, 2.0], &forecast).is_err());
    }
}
