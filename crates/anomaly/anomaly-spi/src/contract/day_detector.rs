//! Unusual day detector trait definition.

use crate::error::Result;
use crate::model::{UnusualDayMask, VolatilityForecast};

/// Flags individual days whose change is improbable under a volatility forecast.
pub trait UnusualDayDetector: Send + Sync {
    /// Produce a mask aligned with `daily_changes`.
    fn detect(
        &self,
        daily_changes: &[f64],
        forecast: &VolatilityForecast,
    ) -> Result<UnusualDayMask>;
}
