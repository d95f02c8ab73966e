// src/config.rs
//! Numerical settings shared by the analytic formulas.

use crate::error::{validation::*, SdeError, SdeResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyticConfig {
    /// Below this value of `mr * texp` the average-variance variance is summed
    /// from its power series instead of the closed form.
    pub series_threshold: f64,
    /// `|rho|` above this raises the ignored-correlation advisory.
    pub rho_tolerance: f64,
    /// Negative variances smaller than this in magnitude are reported as zero.
    pub variance_tolerance: f64,
}

impl AnalyticConfig {
    /// Validate the analytic configuration
    pub fn validate(&self) -> SdeResult<()> {
        validate_non_negative("series_threshold", self.series_threshold)?;
        validate_non_negative("rho_tolerance", self.rho_tolerance)?;
        validate_non_negative("variance_tolerance", self.variance_tolerance)?;

        // Past ~1 the series needs many terms and the closed form is already exact.
        if self.series_threshold > 1.0 {
            return Err(SdeError::InvalidConfiguration {
                field: "series_threshold".to_string(),
                reason: format!(
                    "{} is above 1.0; the closed form is stable there",
                    self.series_threshold
                ),
            });
        }

        Ok(())
    }
}

impl Default for AnalyticConfig {
    fn default() -> Self {
        AnalyticConfig {
            series_threshold: 0.1,
            rho_tolerance: 1e-8,
            variance_tolerance: 1e-14,
        }
    }
}
