//! Turns a search result into a found / not-found verdict.

use std::fmt;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::objective::Direction;
use crate::optimizer::{optimize_trade, OptimizationResult};
use crate::pool::ReservePair;

/// Outcome of [`find_optimal_trade`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ArbitrageReport {
    /// Strictly positive profit at the resolved amount.
    pub found: bool,
    /// Bridge-token (quote) amount to route.
    pub amount: f64,
    /// Profit in quote; `<= 0` when `found` is false.
    pub profit: f64,
    pub direction: Direction,
    pub evaluations: usize,
    pub iterations: usize,
    pub converged: bool,
    pub upper_bound: f64,
}

impl ArbitrageReport {
    pub fn from_result(result: &OptimizationResult) -> Self {
        let found = result.profit > 0.0;
        if found {
            tracing::debug!(
                amount = result.amount,
                profit = result.profit,
                direction = %result.direction,
                "arbitrage opportunity found"
            );
        } else {
            tracing::debug!(profit = result.profit, "no profitable trade size");
        }

        Self {
            found,
            amount: result.amount,
            profit: result.profit,
            direction: result.direction,
            evaluations: result.evaluations,
            iterations: result.iterations,
            converged: result.converged,
            upper_bound: result.bounds.upper,
        }
    }

    /// `(buy_pool, sell_pool)` labels.
    pub fn route(&self) -> (&'static str, &'static str) {
        self.direction.pools()
    }
}

impl fmt::Display for ArbitrageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.found {
            return write!(
                f,
                "Negative profit of {} - no arbitrage opportunity exists",
                self.profit
            );
        }

        let (buy, sell) = self.route();
        write!(
            f,
            "Buy base in pool {buy} with {} quote and sell it in pool {sell} for a profit of {}",
            self.amount, self.profit
        )
    }
}

/// Searches for the most profitable single arbitrage trade between two
/// pools using the default configuration.
pub fn find_optimal_trade(
    reserves_a: ReservePair,
    reserves_b: ReservePair,
) -> Result<ArbitrageReport> {
    find_optimal_trade_with(reserves_a, reserves_b, &SearchConfig::default())
}

/// [`find_optimal_trade`] with an explicit configuration.
pub fn find_optimal_trade_with(
    reserves_a: ReservePair,
    reserves_b: ReservePair,
    config: &SearchConfig,
) -> Result<ArbitrageReport> {
    let result = optimize_trade(reserves_a, reserves_b, config)?;
    Ok(ArbitrageReport::from_result(&result))
}
