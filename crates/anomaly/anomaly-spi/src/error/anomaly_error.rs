//! Unusual range detection error types.

use thiserror::Error;

/// Errors raised by one invocation of the unusual range pipeline.
///
/// Every variant is local to the call that produced it; the pipeline holds no
/// state that would need to be rolled back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnomalyError {
    /// Malformed input: missing fields, length mismatch, unparseable or
    /// non-increasing timestamps, non-finite prices.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Insufficient data: required {required}, got {got}")]
    InsufficientData { required: usize, got: usize },

    /// The volatility model could not be fitted (degenerate series or the
    /// optimizer did not converge).
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// The threshold test flagged no day at the given confidence level.
    #[error("No unusual dates found at confidence level {confidence_level}")]
    NoAnomaliesFound { confidence_level: f64 },

    #[error("Detection timed out after {budget_ms} ms")]
    Timeout { budget_ms: u64 },

    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The worker running the pipeline panicked or was cancelled.
    #[error("Detection task failed: {0}")]
    TaskFailed(String),
}

impl AnomalyError {
    pub fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether retrying with a smaller window can succeed.
    ///
    /// Only a timeout qualifies: every other variant is a pure function of the
    /// input and fails identically on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result type for unusual range detection.
pub type Result<T> = std::result::Result<T, AnomalyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_display() {
        let error = AnomalyError::InvalidInput("missing 'price'".to_string());
        assert_eq!(error.to_string(), "Invalid input: missing 'price'");
    }

    #[test]
    fn test_insufficient_data_display() {
        let error = AnomalyError::InsufficientData {
            required: 2,
            got: 1,
        };
        assert_eq!(error.to_string(), "Insufficient data: required 2, got 1");
    }

    #[test]
    fn test_model_fit_display() {
        let error = AnomalyError::ModelFit("zero variance".to_string());
        assert_eq!(error.to_string(), "Model fit failed: zero variance");
    }

    #[test]
    fn test_no_anomalies_display() {
        let error = AnomalyError::NoAnomaliesFound {
            confidence_level: 0.001,
        };
        assert_eq!(
            error.to_string(),
            "No unusual dates found at confidence level 0.001"
        );
    }

    #[test]
    fn test_timeout_display() {
        let error = AnomalyError::Timeout { budget_ms: 250 };
        assert_eq!(error.to_string(), "Detection timed out after 250 ms");
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let error = AnomalyError::invalid_parameter("confidence_level", "must lie in (0, 1)");
        assert_eq!(
            error.to_string(),
            "Invalid parameter: confidence_level - must lie in (0, 1)"
        );
    }

    #[test]
    fn test_only_timeout_is_retryable() {
        assert!(AnomalyError::Timeout { budget_ms: 1 }.is_retryable());
        assert!(!AnomalyError::ModelFit("x".to_string()).is_retryable());
        assert!(!AnomalyError::InvalidInput("x".to_string()).is_retryable());
        assert!(!AnomalyError::NoAnomaliesFound {
            confidence_level: 0.05
        }
        .is_retryable());
    }

    #[test]
    fn test_timeout_distinct_from_model_fit() {
        let timeout = AnomalyError::Timeout { budget_ms: 10 };
        assert!(!matches!(timeout, AnomalyError::ModelFit(_)));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error: Box<dyn std::error::Error> =
            Box::new(AnomalyError::TaskFailed("worker panicked".to_string()));
        assert_eq!(error.to_string(), "Detection task failed: worker panicked");
    }

    #[test]
    fn test_all_error_variants_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AnomalyError>();
    }
}
