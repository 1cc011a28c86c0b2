//! Detection configuration types.

use anomaly_spi::{AnomalyError, Result};
use serde::{Deserialize, Serialize};

// ============================================================================
// Policies
// ============================================================================

/// Which statistical tests a day must fail to be flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPolicy {
    /// `|change| > z * volatility` only.
    #[default]
    VolatilityOnly,
    /// Volatility test AND `|change - mean| / stdev > z`. Falls back to the
    /// volatility-only mask when the conjunction flags nothing.
    Combined,
}

/// How the merge threshold between consecutive flagged days is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapThresholdPolicy {
    /// `mean(gaps) + stdev(gaps)` (population standard deviation).
    #[default]
    MeanPlusStdDev,
    /// `median(gaps)`.
    Median,
}

/// Output ordering of the final ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOrdering {
    /// Ascending by start date.
    #[default]
    Chronological,
    /// Longest span first; ties broken by start date.
    SpanDescending,
}

// ============================================================================
// GARCH Configuration
// ============================================================================

/// Optimizer settings for the GARCH(1,1) maximum likelihood fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchConfig {
    /// Simplex iterations before the fit is declared non-convergent.
    pub max_iterations: usize,
    /// Relative spread of the simplex likelihood values treated as converged.
    pub tolerance: f64,
}

impl GarchConfig {
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            max_iterations,
            tolerance,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AnomalyError::invalid_parameter(
                "garch.max_iterations",
                "must be at least 1",
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AnomalyError::invalid_parameter(
                "garch.tolerance",
                format!("must be a positive finite number, got {}", self.tolerance),
            ));
        }
        Ok(())
    }
}

impl Default for GarchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5000,
            tolerance: 1e-10,
        }
    }
}

// ============================================================================
// Detection Configuration
// ============================================================================

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Two-tailed significance level in (0, 1) (default: 0.05).
    pub confidence_level: f64,
    pub test_policy: TestPolicy,
    pub gap_policy: GapThresholdPolicy,
    pub ordering: RangeOrdering,
    /// Days a single-day range is widened by (default: 2).
    pub widen_days: i64,
    pub garch: GarchConfig,
}

impl DetectionConfig {
    pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.05;
    pub const DEFAULT_WIDEN_DAYS: i64 = 2;

    pub fn new(confidence_level: f64) -> Self {
        Self {
            confidence_level,
            ..Self::default()
        }
    }

    pub fn with_test_policy(mut self, policy: TestPolicy) -> Self {
        self.test_policy = policy;
        self
    }

    pub fn with_gap_policy(mut self, policy: GapThresholdPolicy) -> Self {
        self.gap_policy = policy;
        self
    }

    pub fn with_ordering(mut self, ordering: RangeOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn with_widen_days(mut self, days: i64) -> Self {
        self.widen_days = days;
        self
    }

    pub fn with_garch(mut self, garch: GarchConfig) -> Self {
        self.garch = garch;
        self
    }

    /// Check every scalar is within its documented range.
    pub fn validate(&self) -> Result<()> {
        let cl = self.confidence_level;
        if !(cl.is_finite() && cl > 0.0 && cl < 1.0) {
            return Err(AnomalyError::invalid_parameter(
                "confidence_level",
                format!("must lie in (0, 1), got {}", cl),
            ));
        }
        if self.widen_days < 0 {
            return Err(AnomalyError::invalid_parameter(
                "widen_days",
                format!("must not be negative, got {}", self.widen_days),
            ));
        }
        self.garch.validate()
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            confidence_level: Self::DEFAULT_CONFIDENCE_LEVEL,
            test_policy: TestPolicy::default(),
            gap_policy: GapThresholdPolicy::default(),
            ordering: RangeOrdering::default(),
            widen_days: Self::DEFAULT_WIDEN_DAYS,
            garch: GarchConfig::default(),
        }
    }
}
