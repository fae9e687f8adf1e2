//! Monte Carlo pricing of European options via simulated geometric
//! Brownian motion paths, with optional antithetic variates.

use super::{OptionInputs, OptionType, PricingError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Number of evenly-spaced sample paths returned for charting.
const SAMPLE_PATHS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceReduction {
    #[default]
    Antithetic,
    None,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloResult {
    pub price: f64,
    pub std_error: f64,
    /// 95% confidence interval `[lower, upper]`.
    pub confidence_interval: [f64; 2],
    pub sample_paths: Vec<Vec<f64>>,
}

pub fn monte_carlo(
    inputs: &OptionInputs,
    n_sims: usize,
    n_steps: usize,
    variance_reduction: VarianceReduction,
    seed: Option<u64>,
) -> Result<MonteCarloResult, PricingError> {
    inputs.validate()?;
    if n_sims < 2 {
        return Err(PricingError::invalid(format!(
            "n_sims must be >= 2, got {n_sims}"
        )));
    }
    if n_steps < 1 {
        return Err(PricingError::invalid(format!(
            "n_steps must be >= 1, got {n_steps}"
        )));
    }

    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_os_rng(),
    };

    let dt = inputs.expiry / n_steps as f64;
    let drift = (inputs.rate - 0.5 * inputs.sigma * inputs.sigma) * dt;
    let sig_sqrt_dt = inputs.sigma * dt.sqrt();
    let discount = (-inputs.rate * inputs.expiry).exp();

    let payoff = |terminal: f64| match inputs.option_type {
        OptionType::Call => (terminal - inputs.strike).max(0.0),
        OptionType::Put => (inputs.strike - terminal).max(0.0),
    };

    let sample_stride = (n_sims / SAMPLE_PATHS).max(1);
    let mut sample_paths = Vec::with_capacity(SAMPLE_PATHS);
    let mut discounted = Vec::with_capacity(n_sims);

    for sim in 0..n_sims {
        let keep_path = sim % sample_stride == 0 && sample_paths.len() < SAMPLE_PATHS;
        let mut path = if keep_path {
            Vec::with_capacity(n_steps + 1)
        } else {
            Vec::new()
        };
        if keep_path {
            path.push(inputs.spot);
        }

        let mut log_s = 0.0;
        let mut log_s_anti = 0.0;
        for _ in 0..n_steps {
            let z = standard_normal(&mut rng);
            log_s += drift + sig_sqrt_dt * z;
            log_s_anti += drift - sig_sqrt_dt * z;
            if keep_path {
                path.push(inputs.spot * log_s.exp());
            }
        }
        if keep_path {
            sample_paths.push(path);
        }

        let terminal = inputs.spot * log_s.exp();
        let value = match variance_reduction {
            VarianceReduction::Antithetic => {
                // Average each path with its mirror to cancel noise.
                let terminal_anti = inputs.spot * log_s_anti.exp();
                0.5 * (payoff(terminal) + payoff(terminal_anti))
            }
            VarianceReduction::None => payoff(terminal),
        };
        discounted.push(discount * value);
    }

    let n = discounted.len() as f64;
    let price = discounted.iter().sum::<f64>() / n;
    let sample_var =
        discounted.iter().map(|v| (v - price).powi(2)).sum::<f64>() / (n - 1.0);
    let std_error = (sample_var / n).sqrt();

    Ok(MonteCarloResult {
        price,
        std_error,
        confidence_interval: [price - 1.96 * std_error, price + 1.96 * std_error],
        sample_paths,
    })
}

/// Box-Muller transform over the generator's uniform output.
fn standard_normal(rng: &mut StdRng) -> f64 {
    // 1 - u keeps the log argument in (0, 1].
    let u1: f64 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pricing::black_scholes::black_scholes;

    fn atm_call() -> OptionInputs {
        OptionInputs {
            spot: 100.0,
            strike: 100.0,
            expiry: 1.0,
            rate: 0.05,
            sigma: 0.2,
            option_type: OptionType::Call,
        }
    }

    #[test]
    fn converges_to_black_scholes_within_ci() {
        let ins = atm_call();
        let bs = black_scholes(&ins).unwrap();
        let mc = monte_carlo(&ins, 50_000, 50, VarianceReduction::Antithetic, Some(7)).unwrap();

        // Generous tolerance: 4 standard errors plus discretization slack.
        let tol = 4.0 * mc.std_error + 0.05;
        assert!(
            (mc.price - bs.price).abs() < tol,
            "MC {} vs BS {} (tol {tol})",
            mc.price,
            bs.price
        );
    }

    #[test]
    fn antithetic_reduces_standard_error() {
        let ins = atm_call();
        let plain = monte_carlo(&ins, 20_000, 10, VarianceReduction::None, Some(11)).unwrap();
        let anti = monte_carlo(&ins, 20_000, 10, VarianceReduction::Antithetic, Some(11)).unwrap();
        assert!(anti.std_error < plain.std_error);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let ins = atm_call();
        let a = monte_carlo(&ins, 5_000, 10, VarianceReduction::Antithetic, Some(42)).unwrap();
        let b = monte_carlo(&ins, 5_000, 10, VarianceReduction::Antithetic, Some(42)).unwrap();
        assert_eq!(a.price, b.price);
    }

    #[test]
    fn returns_capped_sample_paths() {
        let ins = atm_call();
        let mc = monte_carlo(&ins, 1_000, 20, VarianceReduction::None, Some(3)).unwrap();
        assert_eq!(mc.sample_paths.len(), SAMPLE_PATHS);
        for path in &mc.sample_paths {
            assert_eq!(path.len(), 21);
            assert_eq!(path[0], 100.0);
        }
    }
}
