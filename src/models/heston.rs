// src/models/heston.rs
//! Analytic moments of the Heston variance process
//!
//! # Mathematical Framework
//!
//! The Heston model describes asset price evolution with stochastic variance:
//! ```text
//! dS_t = (r - q) S_t dt + √V_t S_t dW_t^(1)
//! dV_t = κ(θ - V_t) dt + ξ√V_t dW_t^(2)
//! ```
//!
//! Where (field names in [`HestonParams`]):
//! - κ (`mr`): Mean reversion speed for variance
//! - θ (`theta`): Long-term variance level
//! - ξ (`vov`): Volatility of variance (vol-of-vol)
//! - ρ (`rho`): Correlation between dW_t^(1) and dW_t^(2)
//! - r, q (`intr`, `divr`): Interest and dividend rates
//! - V_0 (`sigma`): Initial variance
//!
//! # Quantities
//!
//! 1. **Variance moments**: mean and variance of V(t+dt) given V(t)
//! 2. **Average variance moments**: mean and variance of (1/T)∫₀ᵀ V_t dt,
//!    Ball & Roma (1994), Appendix B
//! 3. **Variance swap fair strike**: continuous monitoring equals the mean of the
//!    average variance; discrete monitoring adds an asymptotic correction
//!
//! None of these depend on ρ except the discrete monitoring correction.

use crate::config::AnalyticConfig;
use crate::error::{validation::*, SdeResult};
use crate::math_utils::one_minus_exp_ratio;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const MAX_SERIES_TERMS: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HestonParams {
    pub mr: f64,    // Mean reversion speed
    pub theta: f64, // Long-term variance
    pub vov: f64,   // Volatility of variance (vol-of-vol)
    pub rho: f64,   // Correlation between stock and variance
    pub intr: f64,  // Risk-free rate
    pub divr: f64,  // Dividend yield
    pub sigma: f64, // Initial variance
}

impl HestonParams {
    /// Checks only what the formulas divide by or cannot survive.
    pub fn validate(&self) -> SdeResult<()> {
        validate_positive("mr", self.mr)?;
        validate_finite("theta", self.theta)?;
        validate_finite("vov", self.vov)?;
        validate_finite("rho", self.rho)?;
        validate_finite("intr", self.intr)?;
        validate_finite("divr", self.divr)?;
        validate_finite("sigma", self.sigma)?;
        Ok(())
    }
}

impl Default for HestonParams {
    fn default() -> Self {
        HestonParams {
            mr: 1.0,
            theta: 0.04,
            vov: 0.2,
            rho: 0.0,
            intr: 0.0,
            divr: 0.0,
            sigma: 0.04,
        }
    }
}

/// Mean and variance of a random quantity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MomentPair {
    pub mean: f64,
    pub variance: f64,
}

#[derive(Clone, Copy, Debug)]
pub struct Heston {
    pub params: HestonParams,
    pub config: AnalyticConfig,
}

impl Heston {
    pub fn new(params: HestonParams) -> SdeResult<Self> {
        Self::with_config(params, AnalyticConfig::default())
    }

    pub fn with_config(params: HestonParams, config: AnalyticConfig) -> SdeResult<Self> {
        params.validate()?;
        config.validate()?;
        Ok(Heston { params, config })
    }

    /// Mean and variance of V(t+dt) given V(t) = `var0`
    ///
    /// # Formula
    /// ```text
    /// m  = θ + (V₀ - θ)e^(-κΔt)
    /// s² = [V₀e^(-κΔt) + θ(1 - e^(-κΔt))/2] · ξ²(1 - e^(-κΔt))/κ
    /// ```
    ///
    /// `dt = 0` returns exactly `(var0, 0)`.
    pub fn variance_moments(&self, var0: f64, dt: f64) -> SdeResult<MomentPair> {
        validate_finite("var0", var0)?;
        validate_non_negative("dt", dt)?;

        let p = &self.params;
        let expo = (-p.mr * dt).exp();
        let mean = p.theta + (var0 - p.theta) * expo;
        let s2 = var0 * expo + p.theta * (1.0 - expo) / 2.0;
        let variance = s2 * p.vov * p.vov * (1.0 - expo) / p.mr;

        Ok(MomentPair {
            mean,
            variance: self.clamp_variance(variance),
        })
    }

    /// Stationary distribution moments, the `dt → ∞` limit of
    /// [`Heston::variance_moments`]: `(θ, θξ²/(2κ))`.
    pub fn stationary_moments(&self) -> MomentPair {
        let p = &self.params;
        MomentPair {
            mean: p.theta,
            variance: p.theta * p.vov * p.vov / (2.0 * p.mr),
        }
    }

    /// Mean and variance of the average variance (1/T)∫₀ᵀ V_t dt given V₀ = `var0`
    ///
    /// # Formula
    ///
    /// With u = κT, x₀ = V₀ - θ:
    /// ```text
    /// mean = θ + x₀(1 - e^(-u))/u
    /// var  = [θ - 2x₀e^(-u) + (1 - e^(-u))(V₀ - 2.5θ + (V₀ - θ/2)e^(-u))/u] · (ξ/u)² · T
    /// ```
    ///
    /// The bracket is O(u²), so for `u` below `config.series_threshold` the
    /// variance is summed from its power series instead:
    /// ```text
    /// var = ξ²T Σ_{n≥2} (-u)^(n-2)/(n+1)! · [θ(2ⁿ - 2) + x₀(2ⁿ⁺¹ - 2n - 2)]
    /// ```
    /// whose leading term ξ²TV₀/3 is the Brownian small-time limit.
    pub fn average_variance_moments(&self, var0: f64, texp: f64) -> SdeResult<MomentPair> {
        validate_finite("var0", var0)?;
        validate_positive("texp", texp)?;

        let p = &self.params;
        let mr_t = p.mr * texp;
        let x0 = var0 - p.theta;
        let mean = p.theta + x0 * one_minus_exp_ratio(mr_t);

        let variance = if mr_t < self.config.series_threshold {
            debug!(mr_t, "average variance: using power series");
            average_variance_series(mr_t, p.theta, x0) * p.vov * p.vov * texp
        } else {
            let e_mr = (-mr_t).exp();
            let mut var = (p.theta - 2.0 * x0 * e_mr)
                + (1.0 - e_mr) * (var0 - 2.5 * p.theta + (var0 - p.theta / 2.0) * e_mr) / mr_t;
            var *= (p.vov / mr_t).powi(2) * texp;
            var
        };

        Ok(MomentPair {
            mean,
            variance: self.clamp_variance(variance),
        })
    }

    /// Analytic fair strike of a variance swap on the current variance `sigma`
    ///
    /// `monitoring_freq` is the number of observations per year; `None` means
    /// continuous monitoring, where the strike equals the mean of
    /// [`Heston::average_variance_moments`].
    ///
    /// # Discrete monitoring correction
    ///
    /// With A = `monitoring_freq`, a = κ/A, r_c = (1 - e^(-κT))/(κT), k = ξ/κ:
    /// ```text
    /// K += (θ - 2r)/(4A) · (θ - 2r + 2x₀r_c)
    ///    + θk(k/4 - ρ)(1 - (1 - e^(-a))/a)
    ///    + x₀k(k/2 - ρ) r_c (1 + a/(1 - e^(-a)))
    ///    - (k²(κ - 2V₀) + 2x₀²/κ)(1 - e^(-2κT))/(8κT) · (1 - e^(-a))/(1 + e^(-a))
    /// ```
    ///
    /// # Errors
    ///
    /// `texp ≤ 0` and `monitoring_freq ≤ 0` are rejected before any arithmetic.
    pub fn fair_strike_variance(&self, texp: f64, monitoring_freq: Option<f64>) -> SdeResult<f64> {
        validate_positive("texp", texp)?;
        if let Some(aa) = monitoring_freq {
            validate_positive("monitoring_freq", aa)?;
        }

        let p = &self.params;
        let var0 = p.sigma;

        // Continuously monitored strike, same expression as the average variance mean
        let mr_t = p.mr * texp;
        let e_mr = (-mr_t).exp();
        let x0 = var0 - p.theta;
        let ratio = one_minus_exp_ratio(mr_t);
        let mut strike = p.theta + x0 * ratio;

        if let Some(aa) = monitoring_freq {
            let mr_a = p.mr / aa;
            let e_mr_a = (-mr_a).exp();

            let tmp = p.theta - 2.0 * p.intr;
            strike += tmp / (4.0 * aa) * (tmp + 2.0 * x0 * ratio);

            let tmp = p.vov / p.mr;
            strike += p.theta * tmp * (tmp / 4.0 - p.rho) * (1.0 - (1.0 - e_mr_a) / mr_a);
            strike += x0 * tmp * (tmp / 2.0 - p.rho) * ratio * (1.0 + mr_a / (1.0 - e_mr_a));
            strike -= (tmp * tmp * (p.mr - 2.0 * var0) + 2.0 * x0 * x0 / p.mr)
                * (1.0 - e_mr * e_mr)
                / (8.0 * mr_t)
                * (1.0 - e_mr_a)
                / (1.0 + e_mr_a);
        }

        Ok(strike)
    }

    fn clamp_variance(&self, variance: f64) -> f64 {
        if variance < 0.0 && variance > -self.config.variance_tolerance {
            0.0
        } else {
            variance
        }
    }
}

/// Σ_{n≥2} (-u)^(n-2)/(n+1)! · [θ(2ⁿ - 2) + x₀(2ⁿ⁺¹ - 2n - 2)]
fn average_variance_series(u: f64, theta: f64, x0: f64) -> f64 {
    let mut sum = 0.0;
    let mut u_pow = 1.0;
    let mut factorial = 6.0; // (n+1)!
    let mut two_pow = 4.0; // 2^n
    let mut sign = 1.0;

    for n in 2..MAX_SERIES_TERMS {
        let nf = n as f64;
        let term = sign * u_pow / factorial
            * (theta * (two_pow - 2.0) + x0 * (2.0 * two_pow - 2.0 * nf - 2.0));
        sum += term;
        // n = 2 can vanish exactly (V₀ = 0), so never stop before n = 4
        if n >= 4 && term.abs() <= f64::EPSILON * sum.abs() {
            break;
        }
        u_pow *= u;
        factorial *= nf + 2.0;
        two_pow *= 2.0;
        sign = -sign;
    }

    sum
}

/// Mean and variance of V(t+dt) given V(t) = `var0`, default numerical settings.
pub fn variance_moments(params: &HestonParams, var0: f64, dt: f64) -> SdeResult<MomentPair> {
    Heston::new(*params)?.variance_moments(var0, dt)
}

/// Mean and variance of the average variance over `[0, texp]`, default numerical settings.
pub fn average_variance_moments(
    params: &HestonParams,
    var0: f64,
    texp: f64,
) -> SdeResult<MomentPair> {
    Heston::new(*params)?.average_variance_moments(var0, texp)
}

/// Variance swap fair strike, default numerical settings.
pub fn fair_strike_variance(
    params: &HestonParams,
    texp: f64,
    monitoring_freq: Option<f64>,
) -> SdeResult<f64> {
    Heston::new(*params)?.fair_strike_variance(texp, monitoring_freq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdeError;
    use approx::assert_relative_eq;

    fn base_params() -> HestonParams {
        HestonParams {
            mr: 1.0,
            theta: 0.04,
            vov: 0.2,
            rho: 0.0,
            intr: 0.01,
            divr: 0.0,
            sigma: 0.04,
        }
    }

    #[test]
    fn test_variance_moments_zero_step() {
        let heston = Heston::new(base_params()).expect("Valid parameters");
        let m = heston.variance_moments(0.09, 0.0).expect("Valid step");
        assert_eq!(m.mean, 0.09);
        assert_eq!(m.variance, 0.0);
    }

    #[test]
    fn test_variance_moments_negative_step() {
        let heston = Heston::new(base_params()).expect("Valid parameters");
        assert!(heston.variance_moments(0.04, -0.1).is_err());
    }

    #[test]
    fn test_stationary_limit() {
        let params = HestonParams {
            mr: 2.0,
            vov: 0.5,
            ..base_params()
        };
        let heston = Heston::new(params).expect("Valid parameters");
        let m = heston.variance_moments(0.16, 100.0).expect("Valid step");
        let stationary = heston.stationary_moments();
        assert_relative_eq!(m.mean, stationary.mean, max_relative = 1e-12);
        assert_relative_eq!(m.variance, stationary.variance, max_relative = 1e-12);
        assert_relative_eq!(stationary.variance, 0.04 * 0.25 / 4.0, max_relative = 1e-15);
    }

    #[test]
    fn test_invalid_mean_reversion() {
        let params = HestonParams {
            mr: 0.0,
            ..base_params()
        };
        match Heston::new(params) {
            Err(SdeError::InvalidParameters { parameter, .. }) => assert_eq!(parameter, "mr"),
            other => panic!("expected invalid mr, got {:?}", other),
        }
    }

    #[test]
    fn test_average_variance_reference_value() {
        let heston = Heston::new(base_params()).expect("Valid parameters");
        let m = heston.average_variance_moments(0.04, 1.0).expect("Valid expiry");
        assert!((m.mean - 0.04).abs() < 1e-15);
        assert!((m.variance - 2.6894598515932514e-4).abs() < 1e-10);
    }

    #[test]
    fn test_average_variance_rejects_zero_expiry() {
        let heston = Heston::new(base_params()).expect("Valid parameters");
        assert!(heston.average_variance_moments(0.04, 0.0).is_err());
    }

    #[test]
    fn test_series_matches_closed_form_at_threshold() {
        // u = 0.1 sits on the boundary: closed form is still accurate to ~1e-12 there
        let params = HestonParams {
            vov: 0.3,
            ..base_params()
        };
        let heston = Heston::new(params).expect("Valid parameters");
        let closed = heston.average_variance_moments(0.09, 0.1).expect("Valid expiry");

        let series = average_variance_series(0.1 - 1e-15, 0.04, 0.05) * 0.09 * 0.1;
        assert_relative_eq!(closed.variance, series, max_relative = 1e-10);
        assert_relative_eq!(closed.variance, 2.471989235259833e-4, max_relative = 1e-10);
    }

    #[test]
    fn test_series_leading_term() {
        // var ≈ ξ²TV₀/3 for tiny κT
        let heston = Heston::new(base_params()).expect("Valid parameters");
        let texp = 1e-8;
        let m = heston.average_variance_moments(0.04, texp).expect("Valid expiry");
        assert_relative_eq!(m.variance, 0.04 * 0.04 * texp / 3.0, max_relative = 1e-7);
    }

    #[test]
    fn test_series_zero_initial_variance() {
        let heston = Heston::new(base_params()).expect("Valid parameters");
        let m = heston.average_variance_moments(0.0, 0.01).expect("Valid expiry");
        assert!(m.variance > 0.0);
        // Series value at ξ = 0.3 is 2.97610962958691e-8; variance scales with ξ²
        assert_relative_eq!(
            m.variance,
            2.97610962958691e-8 * (0.2 * 0.2) / (0.3 * 0.3),
            max_relative = 1e-9
        );
    }

    #[test]
    fn test_fair_strike_continuous_equals_average_mean() {
        let params = HestonParams {
            mr: 2.0,
            sigma: 0.09,
            ..base_params()
        };
        let heston = Heston::new(params).expect("Valid parameters");
        let strike = heston.fair_strike_variance(0.5, None).expect("Valid expiry");
        let m = heston.average_variance_moments(0.09, 0.5).expect("Valid expiry");
        assert_eq!(strike, m.mean);
    }

    #[test]
    fn test_fair_strike_discrete_reference_value() {
        let params = HestonParams {
            mr: 2.0,
            vov: 0.5,
            rho: -0.5,
            sigma: 0.09,
            ..base_params()
        };
        let heston = Heston::new(params).expect("Valid parameters");
        let strike = heston.fair_strike_variance(1.0, Some(252.0)).expect("Valid input");
        assert_relative_eq!(strike, 0.06838044540758276, max_relative = 1e-12);
    }

    #[test]
    fn test_fair_strike_rejects_zero_frequency() {
        let heston = Heston::new(base_params()).expect("Valid parameters");
        match heston.fair_strike_variance(1.0, Some(0.0)) {
            Err(SdeError::InvalidParameters { parameter, .. }) => {
                assert_eq!(parameter, "monitoring_freq")
            }
            other => panic!("expected invalid frequency, got {:?}", other),
        }
    }
}
