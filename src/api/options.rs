//! Option-pricing endpoints. Pure computation, no repository access;
//! invalid contract terms come back as 422 with the offending field named.

use crate::api::error::ErrorResponse;
use crate::api::schemas::{
    BinomialRequest, ContractParams, GreeksSurfacePoint, GreeksSurfaceRequest,
    GreeksSurfaceResponse, ImpliedVolRequest, ImpliedVolResponse, MonteCarloRequest,
};
use crate::application::pricing::binomial::{binomial_tree, BinomialResult};
use crate::application::pricing::black_scholes::{black_scholes, BlackScholesResult};
use crate::application::pricing::implied_vol::implied_vol as solve_implied_vol;
use crate::application::pricing::monte_carlo::{monte_carlo, MonteCarloResult};
use crate::application::pricing::{OptionInputs, PricingError};
use axum::Json;

pub async fn black_scholes_price(
    Json(request): Json<ContractParams>,
) -> Result<Json<BlackScholesResult>, ErrorResponse> {
    Ok(Json(black_scholes(&request.to_inputs())?))
}

pub async fn binomial(
    Json(request): Json<BinomialRequest>,
) -> Result<Json<BinomialResult>, ErrorResponse> {
    Ok(Json(binomial_tree(
        &request.contract.to_inputs(),
        request.exercise,
        request.steps,
    )?))
}

pub async fn monte_carlo_price(
    Json(request): Json<MonteCarloRequest>,
) -> Result<Json<MonteCarloResult>, ErrorResponse> {
    Ok(Json(monte_carlo(
        &request.contract.to_inputs(),
        request.n_sims,
        request.n_steps,
        request.variance_reduction,
        request.seed,
    )?))
}

pub async fn implied_vol(
    Json(request): Json<ImpliedVolRequest>,
) -> Result<Json<ImpliedVolResponse>, ErrorResponse> {
    // The solver treats sigma as the unknown; seed it with any valid value.
    let inputs = OptionInputs {
        spot: request.spot,
        strike: request.strike,
        expiry: request.expiry,
        rate: request.rate,
        sigma: 0.2,
        option_type: request.option_type,
    };
    let implied_vol = solve_implied_vol(request.market_price, &inputs)?;
    Ok(Json(ImpliedVolResponse { implied_vol }))
}

/// Greeks swept across a spot grid centered on the requested spot, for
/// surface charts.
pub async fn greeks_surface(
    Json(request): Json<GreeksSurfaceRequest>,
) -> Result<Json<GreeksSurfaceResponse>, ErrorResponse> {
    if !(request.spot_range_pct > 0.0 && request.spot_range_pct < 1.0) {
        return Err(PricingError::invalid(format!(
            "spot_range_pct must be in (0, 1), got {}",
            request.spot_range_pct
        ))
        .into());
    }
    if request.points < 2 || request.points > 500 {
        return Err(PricingError::invalid(format!(
            "points must be in 2..=500, got {}",
            request.points
        ))
        .into());
    }

    let base = request.contract.to_inputs();
    base.validate()?;

    let low = base.spot * (1.0 - request.spot_range_pct);
    let step = 2.0 * base.spot * request.spot_range_pct / (request.points - 1) as f64;

    let mut points = Vec::with_capacity(request.points);
    for i in 0..request.points {
        let inputs = OptionInputs {
            spot: low + step * i as f64,
            ..base
        };
        let greeks = black_scholes(&inputs)?;
        points.push(GreeksSurfacePoint {
            spot: inputs.spot,
            price: greeks.price,
            delta: greeks.delta,
            gamma: greeks.gamma,
            theta: greeks.theta,
            vega: greeks.vega,
            rho: greeks.rho,
        });
    }
    Ok(Json(GreeksSurfaceResponse { points }))
}
