// src/analytics/ball_roma.rs
//! Ball & Roma (1994) approximation for European options under an uncorrelated Heston model
//!
//! # Mathematical Foundation
//!
//! With ρ = 0 the option price is the flat-volatility price averaged over the
//! distribution of the average variance Ā = (1/T)∫₀ᵀ V_t dt:
//! ```text
//! V_Heston = E[ V_BS(σ² = Ā) ]
//! ```
//!
//! Expanding V_BS around the mean E[Ā] to second order:
//! ```text
//! V_Heston ≈ V_BS(E[Ā]) + ½ Var[Ā] · ∂²V_BS/∂v² (E[Ā])
//! ```
//!
//! The moments of Ā come from [`Heston::average_variance_moments`]. A non-zero
//! ρ is ignored; the caller is told through an [`Advisory`].

use super::bs_analytic::{Bsm, CallPut, FlatVolPricer};
use crate::error::{validation::*, SdeError, SdeResult};
use crate::models::heston::{Heston, HestonParams};
use rayon::prelude::*;
use std::fmt;
use std::marker::PhantomData;
use tracing::warn;

/// Expansion order of the approximation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApproxOrder {
    /// Flat price at the mean average variance
    Zeroth,
    /// Adds the ½ Var[Ā] ∂²V/∂v² correction
    Second,
}

impl TryFrom<u32> for ApproxOrder {
    type Error = SdeError;

    /// Order 1 has no term of its own and maps to [`ApproxOrder::Zeroth`].
    fn try_from(order: u32) -> SdeResult<Self> {
        match order {
            0 | 1 => Ok(ApproxOrder::Zeroth),
            2 => Ok(ApproxOrder::Second),
            _ => Err(SdeError::UnsupportedOrder { order }),
        }
    }
}

/// Non-fatal diagnostic attached to a price
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Advisory {
    /// The model correlation is non-zero but the approximation assumes ρ = 0
    CorrelationIgnored { rho: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::CorrelationIgnored { rho } => write!(f, "Pricing ignores rho = {}", rho),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxPrice {
    pub price: f64,
    pub advisory: Option<Advisory>,
}

/// Ball & Roma (1994) pricer over a flat-volatility pricer `P`
pub struct BallRoma1994<P: FlatVolPricer = Bsm> {
    pub heston: Heston,
    pub order: ApproxOrder,
    pricer: PhantomData<fn() -> P>,
}

impl BallRoma1994<Bsm> {
    pub fn new(heston: Heston, order: ApproxOrder) -> Self {
        Self::with_pricer(heston, order)
    }
}

impl<P: FlatVolPricer> BallRoma1994<P> {
    pub fn with_pricer(heston: Heston, order: ApproxOrder) -> Self {
        BallRoma1994 {
            heston,
            order,
            pricer: PhantomData,
        }
    }

    /// Reports a correlation the approximation is about to ignore.
    fn check_correlation(&self) -> Option<Advisory> {
        let rho = self.heston.params.rho;
        if rho.abs() > self.heston.config.rho_tolerance {
            warn!(rho, "Ball-Roma approximation ignores correlation");
            Some(Advisory::CorrelationIgnored { rho })
        } else {
            None
        }
    }

    /// Flat pricer at the matched mean, plus Var[Ā]
    fn matched_pricer(&self, texp: f64) -> SdeResult<(P, f64)> {
        let p = &self.heston.params;
        let moments = self.heston.average_variance_moments(p.sigma, texp)?;
        let flat = P::with_vol(moments.mean.sqrt(), p.intr, p.divr)?;
        Ok((flat, moments.variance))
    }

    fn price_with(
        &self,
        flat: &P,
        avg_var_variance: f64,
        strike: f64,
        spot: f64,
        texp: f64,
        cp: CallPut,
    ) -> f64 {
        let price = flat.price(strike, spot, texp, cp);
        match self.order {
            ApproxOrder::Zeroth => price,
            ApproxOrder::Second => {
                price + 0.5 * avg_var_variance * flat.d2_var(strike, spot, texp, cp)
            }
        }
    }

    /// Approximate price of a European option
    ///
    /// # Errors
    ///
    /// Non-positive `strike`, `spot` or `texp`, or a zero matched volatility
    /// (θ = V₀ = 0), are rejected.
    pub fn price(&self, strike: f64, spot: f64, texp: f64, cp: CallPut) -> SdeResult<ApproxPrice> {
        validate_positive("strike", strike)?;
        validate_positive("spot", spot)?;

        let advisory = self.check_correlation();
        let (flat, var) = self.matched_pricer(texp)?;
        let price = self.price_with(&flat, var, strike, spot, texp, cp);

        Ok(ApproxPrice { price, advisory })
    }

    /// Prices a strip of strikes in parallel. The advisory is raised once.
    pub fn price_strikes(
        &self,
        strikes: &[f64],
        spot: f64,
        texp: f64,
        cp: CallPut,
    ) -> SdeResult<(Vec<f64>, Option<Advisory>)>
    where
        P: Sync,
    {
        validate_positive("spot", spot)?;
        for &strike in strikes {
            validate_positive("strike", strike)?;
        }

        let advisory = self.check_correlation();
        let (flat, var) = self.matched_pricer(texp)?;
        let prices = strikes
            .par_iter()
            .map(|&strike| self.price_with(&flat, var, strike, spot, texp, cp))
            .collect();

        Ok((prices, advisory))
    }
}

/// Ball & Roma price with the default flat pricer and numerical settings.
///
/// `order` follows the integer convention: 0 and 1 give the flat price at the
/// mean average variance, 2 adds the variance correction, anything higher is
/// [`SdeError::UnsupportedOrder`].
pub fn price_uncorrelated_approx(
    params: &HestonParams,
    strike: f64,
    spot: f64,
    texp: f64,
    cp: CallPut,
    order: u32,
) -> SdeResult<ApproxPrice> {
    let order = ApproxOrder::try_from(order)?;
    let heston = Heston::new(*params)?;
    BallRoma1994::new(heston, order).price(strike, spot, texp, cp)
}
