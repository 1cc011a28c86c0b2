//! Volatility model trait definition.

use crate::error::Result;
use crate::model::VolatilityForecast;

/// Conditional volatility model.
///
/// Implementations fit themselves to a sequence of daily changes and return
/// the in-sample conditional standard deviation for every point.
pub trait VolatilityModel: Send + Sync {
    /// Fit the model and return one volatility value per input change.
    ///
    /// Fails with `InsufficientData` for fewer than two changes and with
    /// `ModelFit` when the series is degenerate or the fit does not converge.
    fn fit(&self, daily_changes: &[f64]) -> Result<VolatilityForecast>;

    /// Short model name for logging.
    fn name(&self) -> &str;
}
