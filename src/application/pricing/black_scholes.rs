//! Closed-form Black-Scholes-Merton pricing for European options on
//! non-dividend-paying underlyings, with analytical Greeks.

use super::{norm_cdf, norm_pdf, OptionInputs, OptionType, PricingError};
use serde::Serialize;

/// Price plus the full set of analytical Greeks.
///
/// Theta is per calendar day; vega and rho are per 1% move in volatility
/// and rate respectively (the usual quoting conventions).
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BlackScholesResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

pub fn black_scholes(inputs: &OptionInputs) -> Result<BlackScholesResult, PricingError> {
    inputs.validate()?;

    let d1 = inputs.d1();
    let d2 = inputs.d2();
    let sqrt_t = inputs.expiry.sqrt();
    let discount = (-inputs.rate * inputs.expiry).exp();
    let s = inputs.spot;
    let k = inputs.strike;

    let (price, delta) = match inputs.option_type {
        OptionType::Call => (
            s * norm_cdf(d1) - k * discount * norm_cdf(d2),
            norm_cdf(d1),
        ),
        OptionType::Put => (
            k * discount * norm_cdf(-d2) - s * norm_cdf(-d1),
            norm_cdf(d1) - 1.0,
        ),
    };

    let gamma = norm_pdf(d1) / (s * inputs.sigma * sqrt_t);

    let theta_common = -(s * norm_pdf(d1) * inputs.sigma) / (2.0 * sqrt_t);
    let theta = match inputs.option_type {
        OptionType::Call => theta_common - inputs.rate * k * discount * norm_cdf(d2),
        OptionType::Put => theta_common + inputs.rate * k * discount * norm_cdf(-d2),
    } / 365.0;

    let vega = s * norm_pdf(d1) * sqrt_t * 0.01;

    let rho = match inputs.option_type {
        OptionType::Call => k * inputs.expiry * discount * norm_cdf(d2) * 0.01,
        OptionType::Put => -k * inputs.expiry * discount * norm_cdf(-d2) * 0.01,
    };

    Ok(BlackScholesResult {
        price,
        delta,
        gamma,
        theta,
        vega,
        rho,
    })
}
