// src/analytics/bs_analytic.rs
//! Flat-volatility (Black-Scholes-Merton) pricing for European options
//!
//! # Mathematical Foundation
//!
//! Under constant volatility σ with rate r and dividend yield q:
//! ```text
//! F  = S e^((r-q)T),  D = e^(-rT)
//! d₁ = ln(F/K)/(σ√T) + σ√T/2,  d₂ = d₁ - σ√T
//! V  = D · ω · [F Φ(ω d₁) - K Φ(ω d₂)],  ω = +1 (call) / -1 (put)
//! ```
//!
//! The moment-matching pricers only need the price and its second derivative
//! with respect to the variance v = σ²; both go through the [`FlatVolPricer`]
//! trait so another reference model can stand in.

use crate::error::{validation::*, SdeError, SdeResult};
use crate::math_utils::{norm_cdf, norm_pdf};

/// Option side, carried as the ±1 sign in the pricing formulas
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallPut {
    Call,
    Put,
}

impl CallPut {
    pub fn sign(self) -> f64 {
        match self {
            CallPut::Call => 1.0,
            CallPut::Put => -1.0,
        }
    }
}

impl TryFrom<i32> for CallPut {
    type Error = SdeError;

    fn try_from(flag: i32) -> SdeResult<Self> {
        match flag {
            1 => Ok(CallPut::Call),
            -1 => Ok(CallPut::Put),
            _ => Err(SdeError::InvalidParameters {
                parameter: "cp".to_string(),
                value: flag as f64,
                constraint: "must be 1 (call) or -1 (put)".to_string(),
            }),
        }
    }
}

/// A constant-volatility pricer the moment-matching approximations delegate to.
pub trait FlatVolPricer: Sized {
    /// Build the pricer for volatility `vol`, rate `intr` and dividend yield `divr`.
    fn with_vol(vol: f64, intr: f64, divr: f64) -> SdeResult<Self>;

    fn price(&self, strike: f64, spot: f64, texp: f64, cp: CallPut) -> f64;

    /// ∂²V/∂v² where v = σ² is the variance.
    fn d2_var(&self, strike: f64, spot: f64, texp: f64, cp: CallPut) -> f64;
}

/// Black-Scholes-Merton model with continuous dividend yield
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bsm {
    pub sigma: f64,
    pub intr: f64,
    pub divr: f64,
}

impl Bsm {
    pub fn new(sigma: f64, intr: f64, divr: f64) -> SdeResult<Self> {
        validate_positive("sigma", sigma)?;
        validate_finite("intr", intr)?;
        validate_finite("divr", divr)?;
        Ok(Bsm { sigma, intr, divr })
    }

    /// Returns `(forward, discount factor)`.
    fn forward(&self, spot: f64, texp: f64) -> (f64, f64) {
        let df = (-self.intr * texp).exp();
        let fwd = spot * ((self.intr - self.divr) * texp).exp();
        (fwd, df)
    }

    fn d1_d2(&self, strike: f64, fwd: f64, texp: f64) -> (f64, f64) {
        let sigma_std = self.sigma * texp.sqrt();
        let d1 = (fwd / strike).ln() / sigma_std + 0.5 * sigma_std;
        (d1, d1 - sigma_std)
    }

    /// Vega (∂V/∂σ), identical for calls and puts
    ///
    /// # Formula
    /// ```text
    /// ν = D · F · φ(d₁) · √T
    /// ```
    pub fn vega(&self, strike: f64, spot: f64, texp: f64) -> f64 {
        let (fwd, df) = self.forward(spot, texp);
        let (d1, _) = self.d1_d2(strike, fwd, texp);
        df * fwd * norm_pdf(d1) * texp.sqrt()
    }
}

impl FlatVolPricer for Bsm {
    fn with_vol(vol: f64, intr: f64, divr: f64) -> SdeResult<Self> {
        Bsm::new(vol, intr, divr)
    }

    fn price(&self, strike: f64, spot: f64, texp: f64, cp: CallPut) -> f64 {
        let (fwd, df) = self.forward(spot, texp);
        let (d1, d2) = self.d1_d2(strike, fwd, texp);
        let w = cp.sign();
        df * w * (fwd * norm_cdf(w * d1) - strike * norm_cdf(w * d2))
    }

    /// # Formula
    /// ```text
    /// ∂²V/∂v² = D · F · φ(d₁) · √T · (d₁d₂ - 1) / (4σ³)
    /// ```
    /// Put-call parity makes it independent of the option side.
    fn d2_var(&self, strike: f64, spot: f64, texp: f64, _cp: CallPut) -> f64 {
        let (fwd, df) = self.forward(spot, texp);
        let (d1, d2) = self.d1_d2(strike, fwd, texp);
        df * fwd * norm_pdf(d1) * texp.sqrt() * (d1 * d2 - 1.0) / (4.0 * self.sigma.powi(3))
    }
}
