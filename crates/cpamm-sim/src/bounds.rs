//! Search-domain derivation for the trade size.
//!
//! These are heuristics that keep the optimizer on a finite interval, not
//! tight bounds on the profitable region.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::pool::ReservePair;

/// Smallest trade size the search will try.
pub const DEFAULT_LOWER_BOUND: f64 = 1e-5;

/// Heuristic used to derive the upper bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundStrategy {
    /// Capital-weighted reserve imbalance of both pools.
    #[default]
    CapitalWeighted,
    /// Highest spot price scaled by the deepest base reserve.
    PriceScaled,
}

/// Closed search interval `[lower, upper]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SearchBounds {
    pub lower: f64,
    pub upper: f64,
}

impl SearchBounds {
    /// Derives bounds with the given strategy.
    pub fn derive(
        strategy: BoundStrategy,
        reserves_a: &ReservePair,
        reserves_b: &ReservePair,
        lower: f64,
    ) -> Result<Self> {
        match strategy {
            BoundStrategy::CapitalWeighted => Self::capital_weighted(reserves_a, reserves_b, lower),
            BoundStrategy::PriceScaled => Self::price_scaled(reserves_a, reserves_b, lower),
        }
    }

    /// `upper = (total_b / total) × |base_a − quote_a| + (total_a / total) × |base_b − quote_b|`
    ///
    /// where `total_x = base_x + quote_x` and `total = total_a + total_b`.
    pub fn capital_weighted(
        reserves_a: &ReservePair,
        reserves_b: &ReservePair,
        lower: f64,
    ) -> Result<Self> {
        reserves_a.validate("A")?;
        reserves_b.validate("B")?;

        let total_a = reserves_a.base + reserves_a.quote;
        let total_b = reserves_b.base + reserves_b.quote;
        let total = total_a + total_b;
        let upper = (total_b / total) * (reserves_a.base - reserves_a.quote).abs()
            + (total_a / total) * (reserves_b.base - reserves_b.quote).abs();

        Ok(Self::clamped(lower, upper))
    }

    /// `upper = max(price_a, price_b) × max(base_a, base_b)`.
    pub fn price_scaled(
        reserves_a: &ReservePair,
        reserves_b: &ReservePair,
        lower: f64,
    ) -> Result<Self> {
        reserves_a.validate("A")?;
        reserves_b.validate("B")?;

        let upper =
            reserves_a.price().max(reserves_b.price()) * reserves_a.base.max(reserves_b.base);
        Ok(Self::clamped(lower, upper))
    }

    /// Collapses to the single point `lower` when the heuristic lands at or
    /// below it (e.g. perfectly balanced reserves).
    fn clamped(lower: f64, upper: f64) -> Self {
        let upper = if upper.is_finite() && upper > lower {
            upper
        } else {
            lower
        };
        Self { lower, upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        (self.lower..=self.upper).contains(&x)
    }
}
