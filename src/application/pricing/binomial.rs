//! Cox-Ross-Rubinstein binomial tree pricing with European and American
//! exercise.

use super::{ExerciseStyle, OptionInputs, OptionType, PricingError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BinomialResult {
    pub price: f64,
    /// Approximated from the two step-1 nodes of the tree.
    pub delta: f64,
}

pub fn binomial_tree(
    inputs: &OptionInputs,
    exercise: ExerciseStyle,
    steps: usize,
) -> Result<BinomialResult, PricingError> {
    inputs.validate()?;
    if steps < 1 {
        return Err(PricingError::invalid(format!(
            "steps must be >= 1, got {steps}"
        )));
    }

    let dt = inputs.expiry / steps as f64;
    let up = (inputs.sigma * dt.sqrt()).exp();
    let down = 1.0 / up;
    let discount = (-inputs.rate * dt).exp();
    // Risk-neutral up probability.
    let p = ((inputs.rate * dt).exp() - down) / (up - down);

    // Node j at step i holds S * u^j * d^(i-j) = S * u^(2j - i).
    let stock_at = |step: usize, node: usize| {
        inputs.spot * up.powi(2 * node as i32 - step as i32)
    };
    let intrinsic = |price: f64| match inputs.option_type {
        OptionType::Call => (price - inputs.strike).max(0.0),
        OptionType::Put => (inputs.strike - price).max(0.0),
    };

    let mut values: Vec<f64> = (0..=steps).map(|j| intrinsic(stock_at(steps, j))).collect();

    // Backward induction; keep the step-1 values for the delta estimate.
    let mut step_one = [0.0f64; 2];
    for step in (0..steps).rev() {
        for j in 0..=step {
            let mut v = discount * (p * values[j + 1] + (1.0 - p) * values[j]);
            if exercise == ExerciseStyle::American {
                v = v.max(intrinsic(stock_at(step, j)));
            }
            values[j] = v;
        }
        values.truncate(step + 1);
        if step == 1 {
            step_one = [values[0], values[1]];
        }
    }

    let price = values[0];
    let delta = if steps == 1 {
        (intrinsic(inputs.spot * up) - intrinsic(inputs.spot * down))
            / (inputs.spot * up - inputs.spot * down)
    } else {
        (step_one[1] - step_one[0]) / (inputs.spot * up - inputs.spot * down)
    };

    Ok(BinomialResult { price, delta })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pricing::black_scholes::black_scholes;

    fn inputs(option_type: OptionType) -> OptionInputs {
        OptionInputs {
            spot: 100.0,
            strike: 100.0,
            expiry: 1.0,
            rate: 0.05,
            sigma: 0.2,
            option_type,
        }
    }

    #[test]
    fn european_converges_to_black_scholes() {
        let ins = inputs(OptionType::Call);
        let bs = black_scholes(&ins).unwrap();
        let tree = binomial_tree(&ins, ExerciseStyle::European, 500).unwrap();

        assert!(
            (tree.price - bs.price).abs() < 0.05,
            "tree {} vs closed-form {}",
            tree.price,
            bs.price
        );
        assert!((tree.delta - bs.delta).abs() < 0.01);
    }

    #[test]
    fn american_put_carries_early_exercise_premium() {
        let ins = inputs(OptionType::Put);
        let eur = binomial_tree(&ins, ExerciseStyle::European, 200).unwrap();
        let amer = binomial_tree(&ins, ExerciseStyle::American, 200).unwrap();
        assert!(amer.price > eur.price);
    }

    #[test]
    fn american_call_no_dividend_matches_european() {
        let ins = inputs(OptionType::Call);
        let eur = binomial_tree(&ins, ExerciseStyle::European, 200).unwrap();
        let amer = binomial_tree(&ins, ExerciseStyle::American, 200).unwrap();
        assert!((amer.price - eur.price).abs() < 1e-9);
    }

    #[test]
    fn zero_steps_rejected() {
        assert!(matches!(
            binomial_tree(&inputs(OptionType::Call), ExerciseStyle::European, 0),
            Err(PricingError::InvalidInput { .. })
        ));
    }
}
