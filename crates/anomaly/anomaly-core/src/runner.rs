//! Async offload of the pipeline onto the blocking pool.
//!
//! The GARCH fit is CPU-bound, so async callers hand the whole run to
//! `spawn_blocking` and await it, optionally under a time budget. The worker
//! is not cancelled when the budget expires; its result is discarded.

use std::sync::Arc;
use std::time::Duration;

use anomaly_api::{DetectionConfig, PriceSeriesInput};
use anomaly_spi::{AnomalyError, FormattedRange, Result, VolatilityModel};
use tracing::warn;

use crate::pipeline::UnusualRangePipeline;

/// Run the default GARCH pipeline off the async executor.
pub async fn detect_with_timeout(
    input: PriceSeriesInput,
    config: DetectionConfig,
    budget: Option<Duration>,
) -> Result<Vec<FormattedRange>> {
    let pipeline = UnusualRangePipeline::new(config)?;
    run_with_timeout(Arc::new(pipeline), input, budget).await
}

/// Run an already built pipeline off the async executor.
///
/// Expiry of `budget` surfaces as [`AnomalyError::Timeout`]; a panicking
/// worker as [`AnomalyError::TaskFailed`].
pub async fn run_with_timeout<V>(
    pipeline: Arc<UnusualRangePipeline<V>>,
    input: PriceSeriesInput,
    budget: Option<Duration>,
) -> Result<Vec<FormattedRange>>
where
    V: VolatilityModel + 'static,
{
    let task = tokio::task::spawn_blocking(move || pipeline.run_input(&input));

    let joined = match budget {
        Some(limit) => match tokio::time::timeout(limit, task).await {
            Ok(joined) => joined,
            Err(_) => {
                let budget_ms = u64::try_from(limit.as_millis()).unwrap_or(u64::MAX);
                warn!(budget_ms, "detection exceeded its time budget");
                return Err(AnomalyError::Timeout { budget_ms });
            }
        },
        None => task.await,
    };

    joined.map_err(|e| AnomalyError::TaskFailed(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garch::Garch11;
    use anomaly_spi::VolatilityForecast;

    /// Delegates to GARCH after sleeping.
    struct SlowModel {
        delay: Duration,
    }

    impl VolatilityModel for SlowModel {
        fn fit(&self, daily_changes: &[f64]) -> Result<VolatilityForecast> {
            std::thread::sleep(self.delay);
            Garch11::new().fit(daily_changes)
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    fn spike_input() -> PriceSeriesInput {
        let time = (1..=30).map(|d| format!("2024-04-{:02}", d)).collect();
        let price = (1..=30).map(|d| if d > 12 { 1100.0 } else { 100.0 }).collect();
        PriceSeriesInput::new(time, price)
    }

    #[tokio::test]
    async fn test_completes_within_budget() {
        let ranges = detect_with_timeout(
            spike_input(),
            DetectionConfig::default(),
            Some(Duration::from_secs(30)),
        )
        .await
        .unwrap();
        assert_eq!(
            ranges,
            vec![FormattedRange("2024-04-13".into(), "2024-04-15".into())]
        );
    }

    #[tokio::test]
    async fn test_no_budget() {
        let ranges = detect_with_timeout(spike_input(), DetectionConfig::default(), None)
            .await
            .unwrap();
        assert_eq!(ranges.len(), 1);
    }

    #[tokio::test]
    async fn test_budget_expiry_is_timeout() {
        let model = SlowModel {
            delay: Duration::from_millis(500),
        };
        let pipeline = UnusualRangePipeline::with_model(DetectionConfig::default(), model).unwrap();

        let err = run_with_timeout(
            Arc::new(pipeline),
            spike_input(),
            Some(Duration::from_millis(20)),
        )
        .await
        .unwrap_err();

        assert_eq!(err, AnomalyError::Timeout { budget_ms: 20 });
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_pipeline_errors_pass_through() {
        let input = PriceSeriesInput::new(vec!["2024-04-01".into()], vec![1.0]);
        let err = detect_with_timeout(input, DetectionConfig::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_spawning() {
        let err = detect_with_timeout(spike_input(), DetectionConfig::new(0.0), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidParameter { .. }));
    }
}
