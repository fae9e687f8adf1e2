//! Cross-model consistency tests for the option pricers: the tree and the
//! simulator must agree with the closed form on European contracts, and
//! the implied-vol solver must invert the closed form.

use macrodash::application::pricing::binomial::binomial_tree;
use macrodash::application::pricing::black_scholes::black_scholes;
use macrodash::application::pricing::implied_vol::implied_vol;
use macrodash::application::pricing::monte_carlo::{monte_carlo, VarianceReduction};
use macrodash::application::pricing::{ExerciseStyle, OptionInputs, OptionType};

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
fn models_agree_on_a_european_call() {
    let inputs = atm_call();
    let bs = black_scholes(&inputs).unwrap();

    let tree = binomial_tree(&inputs, ExerciseStyle::European, 1000).unwrap();
    assert!((tree.price - bs.price).abs() < 0.02);
    assert!((tree.delta - bs.delta).abs() < 0.01);

    let mc = monte_carlo(&inputs, 100_000, 50, VarianceReduction::Antithetic, Some(7)).unwrap();
    assert!(
        (mc.price - bs.price).abs() < 4.0 * mc.std_error,
        "MC price {} too far from closed form {} (se {})",
        mc.price,
        bs.price,
        mc.std_error
    );
}

#[test]
fn american_put_carries_early_exercise_premium() {
    let inputs = OptionInputs {
        option_type: OptionType::Put,
        ..atm_call()
    };
    let european = binomial_tree(&inputs, ExerciseStyle::European, 500).unwrap();
    let american = binomial_tree(&inputs, ExerciseStyle::American, 500).unwrap();
    assert!(american.price > european.price);
}

#[test]
fn implied_vol_inverts_the_closed_form() {
    for sigma in [0.1, 0.25, 0.6] {
        let inputs = OptionInputs { sigma, ..atm_call() };
        let price = black_scholes(&inputs).unwrap().price;
        let solved = implied_vol(price, &inputs).unwrap();
        assert!(
            (solved - sigma).abs() < 1e-6,
            "sigma {sigma} recovered as {solved}"
        );
    }
}

#[test]
fn arbitrage_violating_prices_are_rejected() {
    let inputs = atm_call();
    // Below intrinsic value for a call discounted at the risk-free rate.
    assert!(implied_vol(1.0, &inputs).is_err());
    // Above the underlying itself.
    assert!(implied_vol(150.0, &inputs).is_err());
}

#[test]
fn invalid_contracts_are_rejected_everywhere() {
    let bad = OptionInputs {
        sigma: -0.2,
        ..atm_call()
    };
    assert!(black_scholes(&bad).is_err());
    assert!(binomial_tree(&bad, ExerciseStyle::European, 100).is_err());
    assert!(monte_carlo(&bad, 1000, 10, VarianceReduction::None, Some(1)).is_err());
}
