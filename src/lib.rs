//! # heston-moments: Analytic Quantities for the Heston Model
//!
//! Closed-form moments of the Heston variance process, variance swap fair
//! strikes and the Ball & Roma (1994) moment-matching option price.
//!
//! ## Key Features
//!
//! - **Variance moments**: mean/variance of V(t+dt) given V(t)
//! - **Average variance moments**: mean/variance of (1/T)∫₀ᵀ V_t dt, stable as κT → 0
//! - **Variance swaps**: continuous and discretely monitored fair strikes
//! - **Ball & Roma (1994)**: 0th/2nd order approximate prices for ρ = 0,
//!   over any [`FlatVolPricer`](analytics::bs_analytic::FlatVolPricer)
//!
//! ## Quick Start
//!
//! ```rust
//! use heston_moments::analytics::ball_roma::price_uncorrelated_approx;
//! use heston_moments::analytics::bs_analytic::CallPut;
//! use heston_moments::models::heston::{fair_strike_variance, HestonParams};
//!
//! let params = HestonParams {
//!     mr: 1.0,        // Mean reversion speed
//!     theta: 0.04,    // Long-run variance
//!     vov: 0.2,       // Vol-of-vol
//!     rho: 0.0,       // Spot/variance correlation
//!     intr: 0.01,     // Risk-free rate
//!     divr: 0.0,      // Dividend yield
//!     sigma: 0.04,    // Initial variance
//! };
//!
//! let strike = fair_strike_variance(&params, 1.0, Some(252.0)).expect("Valid input");
//! let call = price_uncorrelated_approx(&params, 100.0, 100.0, 1.0, CallPut::Call, 2)
//!     .expect("Valid input");
//! println!("Variance swap strike: {:.6}, call: {:.4}", strike, call.price);
//! ```
//!
//! ## Diagnostics
//!
//! The library never prints. Ignored correlation is returned as an
//! [`Advisory`](analytics::ball_roma::Advisory) and emitted as a `tracing`
//! warning; install a subscriber to see it.

// Module declarations
pub mod analytics;
pub mod config;
pub mod error;
pub mod math_utils;
pub mod models;

// Re-export commonly used types for convenience
pub use config::AnalyticConfig;
pub use error::{SdeError, SdeResult};
pub use models::heston::{Heston, HestonParams, MomentPair};
