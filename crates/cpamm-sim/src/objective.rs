//! Two-pool arbitrage profit for a given bridge-token trade size.
//!
//! The bridge token is the quote side. With `d` quote units we buy base in
//! the pool where base is cheaper (lower quote/base price) and sell that base
//! into the other pool for quote. Profit is measured in quote:
//!
//! ```text
//! profit(d) = sell_pool.swap(Base, buy_pool.swap(Quote, d)) - d
//! ```
//!
//! Every evaluation builds its own pools from the caller's snapshots, so the
//! function is pure in `(d, reserves_a, reserves_b, sign)` and can be called
//! any number of times by a search.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_amount, ArbError, Result};
use crate::pool::{Pool, ReservePair, Token, DEFAULT_FEE_RATE};

/// Which pool to buy base in and which to sell it in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Buy base in pool A, sell it in pool B.
    #[serde(rename = "A→B")]
    AToB,
    /// Buy base in pool B, sell it in pool A.
    #[serde(rename = "B→A")]
    BToA,
}

impl Direction {
    /// Routes through the pool with the lower quote/base price first.
    ///
    /// Fails with [`ArbError::NoArbitrage`] when the prices are exactly equal,
    /// and with [`ArbError::InvalidReserves`] when either price overflowed or
    /// underflowed out of `(0, ∞)`.
    pub fn from_prices(price_a: f64, price_b: f64) -> Result<Self> {
        for (label, price) in [("A", price_a), ("B", price_b)] {
            if !(price.is_finite() && price > 0.0) {
                return Err(ArbError::InvalidReserves(format!(
                    "pool {label} price = {price}; must be finite and strictly positive"
                )));
            }
        }

        if price_b > price_a {
            Ok(Direction::AToB)
        } else if price_a > price_b {
            Ok(Direction::BToA)
        } else {
            Err(ArbError::NoArbitrage { price: price_a })
        }
    }

    /// Direction implied by two reserve snapshots.
    pub fn between(reserves_a: &ReservePair, reserves_b: &ReservePair) -> Result<Self> {
        Self::from_prices(reserves_a.price(), reserves_b.price())
    }

    /// `(buy_pool, sell_pool)` labels.
    pub fn pools(self) -> (&'static str, &'static str) {
        match self {
            Direction::AToB => ("A", "B"),
            Direction::BToA => ("B", "A"),
        }
    }

    /// Same route with the pool labels exchanged.
    pub fn flipped(self) -> Self {
        match self {
            Direction::AToB => Direction::BToA,
            Direction::BToA => Direction::AToB,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (buy, sell) = self.pools();
        write!(f, "{buy}→{sell}")
    }
}

/// One objective evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArbitrageQuery {
    /// Bridge-token (quote) trade size.
    pub amount: f64,
    pub reserves_a: ReservePair,
    pub reserves_b: ReservePair,
    /// `1.0` for profit, `-1.0` for the minimizable negated profit.
    pub sign: f64,
    pub fee_rate: f64,
}

impl ArbitrageQuery {
    pub fn new(amount: f64, reserves_a: ReservePair, reserves_b: ReservePair) -> Self {
        Self {
            amount,
            reserves_a,
            reserves_b,
            sign: 1.0,
            fee_rate: DEFAULT_FEE_RATE,
        }
    }

    /// Signed profit in quote units.
    pub fn evaluate(&self) -> Result<f64> {
        ensure_amount(self.amount)?;
        let mut pool_a = Pool::from_pair(self.reserves_a, self.fee_rate)?;
        let mut pool_b = Pool::from_pair(self.reserves_b, self.fee_rate)?;

        let direction = Direction::from_prices(pool_a.price(), pool_b.price())?;
        let (buy_pool, sell_pool) = match direction {
            Direction::AToB => (&mut pool_a, &mut pool_b),
            Direction::BToA => (&mut pool_b, &mut pool_a),
        };

        let base_bought = buy_pool.swap(Token::Quote, self.amount)?;
        let quote_back = sell_pool.swap(Token::Base, base_bought)?;
        Ok(self.sign * (quote_back - self.amount))
    }
}

/// Signed profit of routing `amount` quote through the cheaper pool first,
/// at the default 0.3% fee.
pub fn arbitrage_profit(
    amount: f64,
    reserves_a: ReservePair,
    reserves_b: ReservePair,
    sign: f64,
) -> Result<f64> {
    arbitrage_profit_with_fee(amount, reserves_a, reserves_b, sign, DEFAULT_FEE_RATE)
}

/// [`arbitrage_profit`] with an explicit fee rate applied on both pools.
pub fn arbitrage_profit_with_fee(
    amount: f64,
    reserves_a: ReservePair,
    reserves_b: ReservePair,
    sign: f64,
    fee_rate: f64,
) -> Result<f64> {
    ArbitrageQuery {
        amount,
        reserves_a,
        reserves_b,
        sign,
        fee_rate,
    }
    .evaluate()
}
