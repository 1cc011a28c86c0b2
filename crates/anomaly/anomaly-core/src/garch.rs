//! GARCH(1,1) volatility model
//!
//! Conditional variance recursion with a constant mean:
//!
//! ```text
//! e_t   = x_t - mu
//! s²_t  = omega + alpha * e²_{t-1} + beta * s²_{t-1}
//! ```
//!
//! Parameters are estimated by Gaussian maximum likelihood. The series is
//! standardized before fitting (the model is scale-equivariant, so this only
//! improves conditioning) and the simplex searches an unconstrained
//! reparameterization that keeps `omega > 0`, `alpha, beta >= 0` and
//! `alpha + beta < 1` by construction. The first conditional variance is
//! backcast from the sample variance of the residuals.

use anomaly_api::GarchConfig;
use anomaly_spi::{AnomalyError, Result, VolatilityForecast, VolatilityModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::simplex;
use crate::stats;

/// Relative spread below which a series is considered constant.
const DEGENERATE_RELATIVE_SCALE: f64 = 1e-10;
/// Bound on the transformed parameters so `exp` never overflows.
const TRANSFORM_BOUND: f64 = 40.0;
const LN_2PI: f64 = 1.837_877_066_409_345_5;

/// GARCH(1,1) model with constant mean and normal innovations.
#[derive(Debug, Clone, Default)]
pub struct Garch11 {
    config: GarchConfig,
}

/// Fitted GARCH(1,1) parameters, in the units of the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GarchFit {
    pub mu: f64,
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
    pub log_likelihood: f64,
    pub iterations: usize,
    /// In-sample conditional standard deviation per input point.
    pub conditional_volatility: Vec<f64>,
}

impl GarchFit {
    /// `alpha + beta`; always below 1 for a fitted model.
    pub fn persistence(&self) -> f64 {
        self.alpha + self.beta
    }

    /// Unconditional variance `omega / (1 - alpha - beta)`.
    pub fn long_run_variance(&self) -> f64 {
        self.omega / (1.0 - self.persistence())
    }

    pub fn forecast(&self) -> VolatilityForecast {
        VolatilityForecast::new(self.conditional_volatility.clone())
    }
}

/// Model parameters on the standardized scale.
#[derive(Debug, Clone, Copy)]
struct Params {
    mu: f64,
    omega: f64,
    alpha: f64,
    beta: f64,
}

impl Params {
    /// Map an unconstrained simplex point onto the admissible region.
    fn decode(theta: &[f64]) -> Self {
        let bounded = |v: f64| v.clamp(-TRANSFORM_BOUND, TRANSFORM_BOUND);
        let ea = bounded(theta[2]).exp();
        let eb = bounded(theta[3]).exp();
        let denom = 1.0 + ea + eb;
        Self {
            mu: theta[0],
            omega: bounded(theta[1]).exp(),
            alpha: ea / denom,
            beta: eb / denom,
        }
    }

    fn encode(&self) -> Vec<f64> {
        let rest = 1.0 - self.alpha - self.beta;
        vec![
            self.mu,
            self.omega.ln(),
            (self.alpha / rest).ln(),
            (self.beta / rest).ln(),
        ]
    }
}

impl Garch11 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: GarchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GarchConfig {
        &self.config
    }

    /// Fit the model and return the full parameter set.
    pub fn fit_model(&self, data: &[f64]) -> Result<GarchFit> {
        if data.len() < 2 {
            return Err(AnomalyError::InsufficientData {
                required: 2,
                got: data.len(),
            });
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(AnomalyError::InvalidInput(
                "daily changes contain non-finite values".to_string(),
            ));
        }

        let scale = stats::std_dev(data);
        let magnitude = data.iter().fold(0.0_f64, |m, x| m.max(x.abs()));
        if scale <= DEGENERATE_RELATIVE_SCALE * magnitude {
            return Err(AnomalyError::ModelFit(
                "degenerate series: daily changes have zero variance".to_string(),
            ));
        }

        let z: Vec<f64> = data.iter().map(|x| x / scale).collect();
        let start = Params {
            mu: stats::mean(&z),
            omega: 0.1,
            alpha: 0.1,
            beta: 0.8,
        };

        let outcome = simplex::minimize(
            |theta| negative_log_likelihood(&z, &Params::decode(theta)),
            &start.encode(),
            &[0.1, 0.5, 0.5, 0.5],
            self.config.max_iterations,
            self.config.tolerance,
        );

        if !outcome.converged {
            return Err(AnomalyError::ModelFit(format!(
                "optimizer did not converge within {} iterations",
                self.config.max_iterations
            )));
        }
        if !outcome.value.is_finite() {
            return Err(AnomalyError::ModelFit(
                "likelihood is not finite at the optimum".to_string(),
            ));
        }

        let fitted = Params::decode(&outcome.point);
        let variances = conditional_variance(&z, &fitted);
        let conditional_volatility: Vec<f64> =
            variances.iter().map(|v| v.sqrt() * scale).collect();

        debug!(
            iterations = outcome.iterations,
            alpha = fitted.alpha,
            beta = fitted.beta,
            "garch(1,1) converged"
        );

        Ok(GarchFit {
            mu: fitted.mu * scale,
            omega: fitted.omega * scale * scale,
            alpha: fitted.alpha,
            beta: fitted.beta,
            // Undo the standardization: each density picks up a 1/scale factor.
            log_likelihood: -outcome.value - data.len() as f64 * scale.ln(),
            iterations: outcome.iterations,
            conditional_volatility,
        })
    }
}

impl VolatilityModel for Garch11 {
    fn fit(&self, daily_changes: &[f64]) -> Result<VolatilityForecast> {
        self.fit_model(daily_changes).map(|fit| fit.forecast())
    }

    fn name(&self) -> &str {
        "garch(1,1)"
    }
}

fn conditional_variance(z: &[f64], p: &Params) -> Vec<f64> {
    let residuals: Vec<f64> = z.iter().map(|x| x - p.mu).collect();
    let backcast = residuals.iter().map(|e| e * e).sum::<f64>() / residuals.len() as f64;

    let mut sigma2 = Vec::with_capacity(residuals.len());
    sigma2.push(backcast);
    for t in 1..residuals.len() {
        let prev_e = residuals[t - 1];
        sigma2.push(p.omega + p.alpha * prev_e * prev_e + p.beta * sigma2[t - 1]);
    }
    sigma2
}

fn negative_log_likelihood(z: &[f64], p: &Params) -> f64 {
    let sigma2 = conditional_variance(z, p);
    let mut nll = 0.0;
    for (x, s2) in z.iter().zip(&sigma2) {
        if !(s2.is_finite() && *s2 > 0.0) {
            return f64::INFINITY;
        }
        let e = x - p.mu;
        nll += 0.5 * (LN_2PI + s2.ln() + e * e / s2);
    }
    nll
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic series with volatility clustering: calm, turbulent, calm.
    fn clustered_changes() -> Vec<f64> {
        (0..120)
            .map(|i| {
                let sign = if (i * 7 + 3) % 5 < 2 { -1.0 } else { 1.0 };
                let wiggle = ((i * 13) % 11) as f64 / 10.0 + 0.2;
                let amplitude = if (40..70).contains(&i) { 4.0 } else { 1.0 };
                sign * wiggle * amplitude
            })
            .collect()
    }

    #[test]
    fn test_fit_returns_aligned_positive_volatility() {
        let data = clustered_changes();
        let fit = Garch11::new().fit_model(&data).unwrap();

        assert_eq!(fit.conditional_volatility.len(), data.len());
        assert!(fit
            .conditional_volatility
            .iter()
            .all(|v| v.is_finite() && *v > 0.0));
    }

    #[test]
    fn test_fit_respects_stationarity_constraints() {
        let fit = Garch11::new().fit_model(&clustered_changes()).unwrap();

        assert!(fit.omega > 0.0);
        assert!(fit.alpha >= 0.0);
        assert!(fit.beta >= 0.0);
        assert!(fit.persistence() < 1.0);
        assert!(fit.long_run_variance() > 0.0);
        assert!(fit.log_likelihood.is_finite());
    }

    #[test]
    fn test_fit_is_deterministic() {
        let data = clustered_changes();
        let a = Garch11::new().fit_model(&data).unwrap();
        let b = Garch11::new().fit_model(&data).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scale_equivariance() {
        let data = clustered_changes();
        let scaled: Vec<f64> = data.iter().map(|x| x * 250.0).collect();

        let small = Garch11::new().fit(&data).unwrap();
        let large = Garch11::new().fit(&scaled).unwrap();

        for (s, l) in small.values().iter().zip(large.values()) {
            assert!((l / s - 250.0).abs() < 1e-3 * 250.0);
        }
    }

    #[test]
    fn test_turbulent_stretch_has_higher_volatility() {
        let fit = Garch11::new().fit_model(&clustered_changes()).unwrap();
        let vol = &fit.conditional_volatility;

        let calm: f64 = vol[10..40].iter().sum::<f64>() / 30.0;
        let turbulent: f64 = vol[45..70].iter().sum::<f64>() / 25.0;
        assert!(turbulent > calm);
    }

    #[test]
    fn test_insufficient_data() {
        let err = Garch11::new().fit(&[1.0]).unwrap_err();
        assert_eq!(
            err,
            AnomalyError::InsufficientData {
                required: 2,
                got: 1
            }
        );
        assert!(Garch11::new().fit(&[]).is_err());
    }

    #[test]
    fn test_constant_changes_are_degenerate() {
        let err = Garch11::new().fit(&[1.0; 30]).unwrap_err();
        assert!(matches!(err, AnomalyError::ModelFit(_)));

        let err = Garch11::new().fit(&[0.0; 10]).unwrap_err();
        assert!(matches!(err, AnomalyError::ModelFit(_)));
    }

    #[test]
    fn test_iteration_budget_surfaces_model_fit_error() {
        let model = Garch11::from_config(GarchConfig::new(2, 1e-12));
        let err = model.fit(&clustered_changes()).unwrap_err();
        assert!(matches!(err, AnomalyError::ModelFit(ref msg) if msg.contains("converge")));
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let err = Garch11::new().fit(&[1.0, f64::INFINITY, 2.0]).unwrap_err();
        assert!(matches!(err, AnomalyError::InvalidInput(_)));
    }

    #[test]
    fn test_params_roundtrip_through_transform() {
        let p = Params {
            mu: 0.25,
            omega: 0.3,
            alpha: 0.15,
            beta: 0.7,
        };
        let q = Params::decode(&p.encode());
        assert!((q.mu - p.mu).abs() < 1e-12);
        assert!((q.omega - p.omega).abs() < 1e-12);
        assert!((q.alpha - p.alpha).abs() < 1e-12);
        assert!((q.beta - p.beta).abs() < 1e-12);
    }
}
