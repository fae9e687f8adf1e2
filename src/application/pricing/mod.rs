//! Option pricing: Black-Scholes closed form, CRR binomial tree, Monte
//! Carlo simulation, and an implied-volatility solver.

pub mod binomial;
pub mod black_scholes;
pub mod implied_vol;
pub mod monte_carlo;

use serde::{Deserialize, Serialize};
use statrs::distribution::{Continuous, ContinuousCDF, Normal};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PricingError {
    #[error("{reason}")]
    InvalidInput { reason: String },

    #[error("no implied volatility solution: {reason}")]
    NoSolution { reason: String },
}

impl PricingError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn no_solution(reason: impl Into<String>) -> Self {
        Self::NoSolution {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseStyle {
    European,
    American,
}

/// Common contract inputs shared by every pricer.
#[derive(Debug, Clone, Copy)]
pub struct OptionInputs {
    /// Current underlying price.
    pub spot: f64,
    /// Strike price.
    pub strike: f64,
    /// Time to expiration in years.
    pub expiry: f64,
    /// Risk-free rate, annualized with continuous compounding.
    pub rate: f64,
    /// Annualized volatility.
    pub sigma: f64,
    pub option_type: OptionType,
}

impl OptionInputs {
    /// Reject non-positive spot, strike, expiry, or volatility.
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.spot <= 0.0 {
            return Err(PricingError::invalid(format!(
                "spot price must be positive, got {}",
                self.spot
            )));
        }
        if self.strike <= 0.0 {
            return Err(PricingError::invalid(format!(
                "strike price must be positive, got {}",
                self.strike
            )));
        }
        if self.expiry <= 0.0 {
            return Err(PricingError::invalid(format!(
                "time to expiration must be positive, got {}",
                self.expiry
            )));
        }
        if self.sigma <= 0.0 {
            return Err(PricingError::invalid(format!(
                "volatility must be positive, got {}",
                self.sigma
            )));
        }
        Ok(())
    }

    pub fn d1(&self) -> f64 {
        ((self.spot / self.strike).ln() + (self.rate + 0.5 * self.sigma * self.sigma) * self.expiry)
            / (self.sigma * self.expiry.sqrt())
    }

    pub fn d2(&self) -> f64 {
        self.d1() - self.sigma * self.expiry.sqrt()
    }
}

pub(crate) fn norm_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

pub(crate) fn norm_pdf(x: f64) -> f64 {
    Normal::standard().pdf(x)
}
