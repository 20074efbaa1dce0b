//! Bounded scalar minimization and the trade-size search built on it.
//!
//! [`minimize_bounded`] is Brent's method restricted to a closed interval:
//! golden-section steps, switching to parabolic interpolation whenever the
//! last three points admit an acceptable parabola. It needs no derivatives,
//! never leaves the interval and stops when the bracket shrinks below
//! `sqrt(eps)·|x| + x_tolerance / 3`, or when the evaluation budget runs out.
//!
//! [`optimize_trade`] runs it on the negated arbitrage profit.

use serde::Serialize;

use crate::bounds::SearchBounds;
use crate::config::SearchConfig;
use crate::error::Result;
use crate::objective::{arbitrage_profit_with_fee, Direction};
use crate::pool::ReservePair;

/// Default absolute tolerance on the argmin.
pub const DEFAULT_X_TOLERANCE: f64 = 1e-5;

/// Default cap on objective evaluations.
pub const DEFAULT_MAX_EVALUATIONS: usize = 500;

/// Stopping rules for [`minimize_bounded`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrentOptions {
    pub x_tolerance: f64,
    pub max_evaluations: usize,
}

impl Default for BrentOptions {
    fn default() -> Self {
        Self {
            x_tolerance: DEFAULT_X_TOLERANCE,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

/// Outcome of a bounded minimization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Minimum {
    pub x: f64,
    pub value: f64,
    pub evaluations: usize,
    pub iterations: usize,
    /// False when the evaluation budget ran out first.
    pub converged: bool,
}

/// Minimizes `f` over `[bounds.lower, bounds.upper]`.
///
/// The first error returned by `f` aborts the search and is propagated.
pub fn minimize_bounded<F, E>(
    mut f: F,
    bounds: SearchBounds,
    options: BrentOptions,
) -> std::result::Result<Minimum, E>
where
    F: FnMut(f64) -> std::result::Result<f64, E>,
{
    let sqrt_eps = f64::EPSILON.sqrt();
    let golden = 0.5 * (3.0 - 5.0_f64.sqrt());

    if bounds.width() <= 0.0 {
        let value = f(bounds.lower)?;
        return Ok(Minimum {
            x: bounds.lower,
            value,
            evaluations: 1,
            iterations: 0,
            converged: true,
        });
    }

    let (mut a, mut b) = (bounds.lower, bounds.upper);
    // x: best point so far, w: second best, v: previous value of w.
    let mut x = a + golden * (b - a);
    let (mut w, mut v) = (x, x);
    let mut fx = f(x)?;
    let (mut fw, mut fv) = (fx, fx);
    let mut evaluations = 1;
    let mut iterations = 0;

    let mut step = 0.0_f64;
    let mut prev_step = 0.0_f64;

    let mut mid = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * x.abs() + options.x_tolerance / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut converged = true;

    while (x - mid).abs() > tol2 - 0.5 * (b - a) {
        if evaluations >= options.max_evaluations {
            converged = false;
            break;
        }

        let mut use_golden = true;
        if prev_step.abs() > tol1 {
            // Parabola through (v, fv), (w, fw), (x, fx).
            let mut r = (x - w) * (fx - fv);
            let mut q = (x - v) * (fx - fw);
            let mut p = (x - v) * q - (x - w) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = prev_step;
            prev_step = step;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - x) && p < q * (b - x) {
                use_golden = false;
                step = p / q;
                let u = x + step;
                if (u - a) < tol2 || (b - u) < tol2 {
                    step = tol1.copysign(mid - x);
                }
            }
        }

        if use_golden {
            prev_step = if x >= mid { a - x } else { b - x };
            step = golden * prev_step;
        }

        let u = x + step.abs().max(tol1).copysign(step);
        let fu = f(u)?;
        evaluations += 1;
        iterations += 1;

        if fu <= fx {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            (v, fv) = (w, fw);
            (w, fw) = (x, fx);
            (x, fx) = (u, fu);
        } else {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                (v, fv) = (w, fw);
                (w, fw) = (u, fu);
            } else if fu <= fv || v == x || v == w {
                (v, fv) = (u, fu);
            }
        }

        mid = 0.5 * (a + b);
        tol1 = sqrt_eps * x.abs() + options.x_tolerance / 3.0;
        tol2 = 2.0 * tol1;
    }

    Ok(Minimum {
        x,
        value: fx,
        evaluations,
        iterations,
        converged,
    })
}

/// Resolved trade size and the profit it earns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct OptimizationResult {
    /// Bridge-token (quote) amount to trade.
    pub amount: f64,
    /// Profit in quote at `amount`; may be zero or negative.
    pub profit: f64,
    /// Route implied by the input prices.
    pub direction: Direction,
    pub evaluations: usize,
    pub iterations: usize,
    /// Search met its tolerance within the evaluation cap.
    pub converged: bool,
    pub bounds: SearchBounds,
}

/// Finds the profit-maximizing bridge-token amount for two pools.
///
/// Fails before any objective evaluation with `InvalidReserves` on a
/// non-positive reserve and with `NoArbitrage` when both pools quote the
/// same price.
pub fn optimize_trade(
    reserves_a: ReservePair,
    reserves_b: ReservePair,
    config: &SearchConfig,
) -> Result<OptimizationResult> {
    optimize_with(reserves_a, reserves_b, config, |amount| {
        arbitrage_profit_with_fee(amount, reserves_a, reserves_b, -1.0, config.fee_rate)
    })
}

fn optimize_with<F>(
    reserves_a: ReservePair,
    reserves_b: ReservePair,
    config: &SearchConfig,
    negated_profit: F,
) -> Result<OptimizationResult>
where
    F: FnMut(f64) -> Result<f64>,
{
    config.validate()?;
    reserves_a.validate("A")?;
    reserves_b.validate("B")?;

    // Prices depend only on the snapshots, so no trial point inside the
    // search can hit the equal-price path once this check passes.
    let direction = Direction::between(&reserves_a, &reserves_b)?;
    let bounds = SearchBounds::derive(config.bounds, &reserves_a, &reserves_b, config.lower_bound)?;
    tracing::debug!(
        lower = bounds.lower,
        upper = bounds.upper,
        strategy = ?config.bounds,
        %direction,
        "search bounds derived"
    );

    let options = BrentOptions {
        x_tolerance: config.x_tolerance,
        max_evaluations: config.max_evaluations,
    };
    let minimum = minimize_bounded(negated_profit, bounds, options)?;

    if minimum.converged {
        tracing::debug!(
            amount = minimum.x,
            profit = -minimum.value,
            evaluations = minimum.evaluations,
            "search converged"
        );
    } else {
        tracing::warn!(
            amount = minimum.x,
            evaluations = minimum.evaluations,
            max_evaluations = config.max_evaluations,
            "evaluation budget exhausted before convergence"
        );
    }

    Ok(OptimizationResult {
        amount: minimum.x,
        profit: -minimum.value,
        direction,
        evaluations: minimum.evaluations,
        iterations: minimum.iterations,
        converged: minimum.converged,
        bounds,
    })
}
