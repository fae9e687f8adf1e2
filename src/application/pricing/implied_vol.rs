//! Implied volatility solver: Newton-Raphson seeded with the
//! Brenner-Subrahmanyam approximation, falling back to bisection when the
//! vega step degenerates.

use super::black_scholes::black_scholes;
use super::{OptionInputs, OptionType, PricingError};

const TOL: f64 = 1e-8;
const MAX_ITER: usize = 100;
const SIGMA_FLOOR: f64 = 1e-6;
const SIGMA_CEIL: f64 = 10.0;

pub fn implied_vol(market_price: f64, inputs: &OptionInputs) -> Result<f64, PricingError> {
    // Validate everything except sigma, which is what we are solving for.
    let probe = OptionInputs {
        sigma: 1.0,
        ..*inputs
    };
    probe.validate()?;
    if market_price <= 0.0 {
        return Err(PricingError::invalid(format!(
            "market price must be positive, got {market_price}"
        )));
    }

    // Arbitrage bounds: outside them no volatility can match the price.
    let discount = (-inputs.rate * inputs.expiry).exp();
    let (intrinsic, upper_bound) = match inputs.option_type {
        OptionType::Call => ((inputs.spot - inputs.strike * discount).max(0.0), inputs.spot),
        OptionType::Put => (
            (inputs.strike * discount - inputs.spot).max(0.0),
            inputs.strike * discount,
        ),
    };
    if market_price < intrinsic - TOL {
        return Err(PricingError::no_solution(format!(
            "market price {market_price} is below intrinsic value {intrinsic:.6}"
        )));
    }
    if market_price > upper_bound + TOL {
        return Err(PricingError::no_solution(format!(
            "market price {market_price} exceeds the theoretical upper bound {upper_bound:.6}"
        )));
    }

    let price_at = |sigma: f64| -> Result<(f64, f64), PricingError> {
        let result = black_scholes(&OptionInputs { sigma, ..*inputs })?;
        // Vega is quoted per 1%; Newton needs the per-unit derivative.
        Ok((result.price, result.vega / 0.01))
    };

    // Brenner-Subrahmanyam starting point.
    let mut sigma = ((2.0 * std::f64::consts::PI / inputs.expiry).sqrt() * market_price
        / inputs.spot)
        .clamp(0.01, 5.0);

    for _ in 0..MAX_ITER {
        let (price, vega) = price_at(sigma)?;
        let diff = price - market_price;
        if diff.abs() < TOL {
            return Ok(sigma);
        }
        if vega < 1e-12 {
            break;
        }
        sigma = (sigma - diff / vega).clamp(SIGMA_FLOOR, SIGMA_CEIL);
    }

    // Bisection fallback over the full sigma range.
    let mut lo = SIGMA_FLOOR;
    let mut hi = SIGMA_CEIL;
    let (price_lo, _) = price_at(lo)?;
    let (price_hi, _) = price_at(hi)?;
    if market_price < price_lo || market_price > price_hi {
        return Err(PricingError::no_solution(format!(
            "price range [{price_lo:.6}, {price_hi:.6}] does not bracket {market_price:.6}"
        )));
    }

    for _ in 0..MAX_ITER {
        let mid = 0.5 * (lo + hi);
        let (price, _) = price_at(mid)?;
        let diff = price - market_price;
        if diff.abs() < TOL || (hi - lo) < TOL {
            return Ok(mid);
        }
        if diff > 0.0 {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    Ok(0.5 * (lo + hi))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(option_type: OptionType) -> OptionInputs {
        OptionInputs {
            spot: 100.0,
            strike: 105.0,
            expiry: 0.5,
            rate: 0.03,
            sigma: 0.0, // solved for
            option_type,
        }
    }

    #[test]
    fn round_trips_black_scholes_price() {
        for true_sigma in [0.1, 0.25, 0.6] {
            let ins = OptionInputs {
                sigma: true_sigma,
                ..inputs(OptionType::Call)
            };
            let price = black_scholes(&ins).unwrap().price;
            let solved = implied_vol(price, &ins).unwrap();
            assert!(
                (solved - true_sigma).abs() < 1e-5,
                "sigma {true_sigma} recovered as {solved}"
            );
        }
    }

    #[test]
    fn put_round_trip() {
        let ins = OptionInputs {
            sigma: 0.3,
            ..inputs(OptionType::Put)
        };
        let price = black_scholes(&ins).unwrap().price;
        let solved = implied_vol(price, &ins).unwrap();
        assert!((solved - 0.3).abs() < 1e-5);
    }

    #[test]
    fn price_below_intrinsic_has_no_solution() {
        let ins = OptionInputs {
            spot: 150.0,
            strike: 100.0,
            ..inputs(OptionType::Call)
        };
        // Deep ITM call priced at a fraction of intrinsic.
        assert!(matches!(
            implied_vol(1.0, &ins),
            Err(PricingError::NoSolution { .. })
        ));
    }

    #[test]
    fn price_above_upper_bound_has_no_solution() {
        assert!(matches!(
            implied_vol(150.0, &inputs(OptionType::Call)),
            Err(PricingError::NoSolution { .. })
        ));
    }
}
