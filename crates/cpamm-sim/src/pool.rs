//! Constant-product pool with fee-aware swaps.
//!
//! A pool holds a base reserve `x` (the numeraire, e.g. DAI) and a quote
//! reserve `y` (e.g. ETH) and keeps `k = x × y` in sync after every
//! mutation. Swaps deduct the fee from the input before the product formula
//! is applied while the full input lands in the reserves, so `k` never
//! decreases and grows whenever the fee is non-zero:
//!
//! ```text
//! effective_in = amount_in × (1 - fee)
//! new_out      = k / (reserve_in + effective_in)
//! amount_out   = reserve_out - new_out
//! ```
//!
//! Strict growth of `k` only holds above f64 resolution: a dust swap whose
//! retained fee is lost in rounding can leave `k` bit-identical.
//!
//! All reserves stay strictly positive; an operation that would violate that
//! fails before touching state. Liquidity changes must be strictly positive
//! on both sides and at the pool ratio, else they fail with
//! [`ArbError::LiquidityRatioMismatch`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ensure_amount, ensure_reserve, ArbError, Result};
use crate::events::{EventSink, NoopSink, PoolEvent};

/// Swap fee of the reference pools: 0.3% of the input amount.
pub const DEFAULT_FEE_RATE: f64 = 0.003;

/// Relative tolerance for the liquidity ratio check.
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// Side of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Token {
    /// Numeraire side (`DAI` in the reference scenario).
    Base,
    /// Quote side and bridge token (`ETH` in the reference scenario).
    Quote,
}

impl Token {
    /// The opposite side of the pair.
    pub fn other(self) -> Self {
        match self {
            Token::Base => Token::Quote,
            Token::Quote => Token::Base,
        }
    }

    /// Reference symbol for this side.
    pub fn symbol(self) -> &'static str {
        match self {
            Token::Base => "DAI",
            Token::Quote => "ETH",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Base => f.write_str("base"),
            Token::Quote => f.write_str("quote"),
        }
    }
}

impl FromStr for Token {
    type Err = ArbError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "base" | "dai" => Ok(Token::Base),
            "quote" | "eth" => Ok(Token::Quote),
            _ => Err(ArbError::InvalidToken(s.to_string())),
        }
    }
}

/// Caller-owned reserve snapshot for one pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReservePair {
    pub base: f64,
    pub quote: f64,
}

impl ReservePair {
    pub const fn new(base: f64, quote: f64) -> Self {
        Self { base, quote }
    }

    /// Spot price in quote per base (`quote / base`).
    pub fn price(&self) -> f64 {
        self.quote / self.base
    }

    /// Fails with [`ArbError::InvalidReserves`] unless both sides are positive
    /// and their price is representable as a finite, non-zero `f64`.
    pub fn validate(&self, pool_label: &str) -> Result<()> {
        ensure_reserve(&format!("pool {pool_label} base reserve"), self.base)?;
        ensure_reserve(&format!("pool {pool_label} quote reserve"), self.quote)?;
        ensure_reserve(&format!("pool {pool_label} price"), self.price())
    }
}

/// Point-in-time view of a pool, used in events and reports.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PoolSnapshot {
    pub base: f64,
    pub quote: f64,
    pub invariant: f64,
}

/// Uniswap V2-style constant-product pool over `f64` reserves.
#[derive(Clone, Debug, PartialEq)]
pub struct Pool {
    reserve_base: f64,
    reserve_quote: f64,
    invariant: f64,
    fee_rate: f64,
}

impl Pool {
    /// Creates a pool charging [`DEFAULT_FEE_RATE`].
    pub fn new(reserve_base: f64, reserve_quote: f64) -> Result<Self> {
        Self::with_fee(reserve_base, reserve_quote, DEFAULT_FEE_RATE)
    }

    /// Creates a pool with an explicit fee rate in `[0, 1)`.
    pub fn with_fee(reserve_base: f64, reserve_quote: f64, fee_rate: f64) -> Result<Self> {
        ensure_reserve("base reserve", reserve_base)?;
        ensure_reserve("quote reserve", reserve_quote)?;
        if !(0.0..1.0).contains(&fee_rate) {
            return Err(ArbError::InvalidFeeRate(fee_rate));
        }

        Ok(Self {
            reserve_base,
            reserve_quote,
            invariant: reserve_base * reserve_quote,
            fee_rate,
        })
    }

    /// Builds a fresh pool from a reserve snapshot.
    pub fn from_pair(pair: ReservePair, fee_rate: f64) -> Result<Self> {
        Self::with_fee(pair.base, pair.quote, fee_rate)
    }

    pub fn reserve_base(&self) -> f64 {
        self.reserve_base
    }

    pub fn reserve_quote(&self) -> f64 {
        self.reserve_quote
    }

    /// Current `base × quote`.
    pub fn invariant(&self) -> f64 {
        self.invariant
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate
    }

    /// Spot price in quote per base.
    pub fn price(&self) -> f64 {
        self.reserve_quote / self.reserve_base
    }

    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            base: self.reserve_base,
            quote: self.reserve_quote,
            invariant: self.invariant,
        }
    }

    /// `(reserve_in, reserve_out)` when `token` is the input side.
    fn reserves_for(&self, token: Token) -> (f64, f64) {
        match token {
            Token::Base => (self.reserve_base, self.reserve_quote),
            Token::Quote => (self.reserve_quote, self.reserve_base),
        }
    }

    /// Output of swapping `amount_in` of `token` without mutating the pool.
    pub fn quote_output(&self, token: Token, amount_in: f64) -> Result<f64> {
        ensure_amount(amount_in)?;
        let (reserve_in, reserve_out) = self.reserves_for(token);
        let effective_in = amount_in * (1.0 - self.fee_rate);
        let new_out = self.invariant / (reserve_in + effective_in);
        Ok(reserve_out - new_out)
    }

    /// Swaps `amount_in` of `token` into the pool and returns the amount of
    /// the other token paid out.
    pub fn swap(&mut self, token: Token, amount_in: f64) -> Result<f64> {
        self.swap_with(token, amount_in, &mut NoopSink)
    }

    /// Parses a token identifier, then swaps.
    pub fn swap_symbol(&mut self, token: &str, amount_in: f64) -> Result<f64> {
        let token = token.parse::<Token>()?;
        self.swap(token, amount_in)
    }

    /// [`Pool::swap`] reporting the transition to `sink`.
    pub fn swap_with(
        &mut self,
        token: Token,
        amount_in: f64,
        sink: &mut impl EventSink,
    ) -> Result<f64> {
        ensure_amount(amount_in)?;
        let before = self.snapshot();
        let (reserve_in, reserve_out) = self.reserves_for(token);

        let effective_in = amount_in * (1.0 - self.fee_rate);
        let new_out = self.invariant / (reserve_in + effective_in);
        let new_in = reserve_in + amount_in;
        ensure_reserve("post-swap output reserve", new_out)?;
        ensure_reserve("post-swap input reserve", new_in)?;
        let amount_out = reserve_out - new_out;

        match token {
            Token::Base => {
                self.reserve_base = new_in;
                self.reserve_quote = new_out;
            }
            Token::Quote => {
                self.reserve_quote = new_in;
                self.reserve_base = new_out;
            }
        }
        self.invariant = self.reserve_base * self.reserve_quote;

        sink.record(PoolEvent::Swap {
            input_token: token,
            amount_in,
            fee_retained: amount_in - effective_in,
            amount_out,
            before,
            after: self.snapshot(),
        });

        Ok(amount_out)
    }

    /// Both amounts must be finite, strictly positive and at the pool ratio.
    fn ensure_ratio(&self, base: f64, quote: f64) -> Result<()> {
        let provided = base / quote;
        let expected = self.reserve_base / self.reserve_quote;
        let positive = base.is_finite() && quote.is_finite() && base > 0.0 && quote > 0.0;
        if !(positive && (provided - expected).abs() <= RATIO_TOLERANCE * expected) {
            return Err(ArbError::LiquidityRatioMismatch { provided, expected });
        }
        Ok(())
    }

    /// Deposits liquidity at the pool's current ratio.
    pub fn add_liquidity(&mut self, base: f64, quote: f64) -> Result<()> {
        self.add_liquidity_with(base, quote, &mut NoopSink)
    }

    pub fn add_liquidity_with(
        &mut self,
        base: f64,
        quote: f64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.ensure_ratio(base, quote)?;
        let before = self.snapshot();

        self.reserve_base += base;
        self.reserve_quote += quote;
        self.invariant = self.reserve_base * self.reserve_quote;

        sink.record(PoolEvent::AddLiquidity {
            base,
            quote,
            before,
            after: self.snapshot(),
        });
        Ok(())
    }

    /// Withdraws liquidity at the pool's current ratio.
    ///
    /// Fails with [`ArbError::InvalidReserves`] if either reserve would drop
    /// to zero or below.
    pub fn remove_liquidity(&mut self, base: f64, quote: f64) -> Result<()> {
        self.remove_liquidity_with(base, quote, &mut NoopSink)
    }

    pub fn remove_liquidity_with(
        &mut self,
        base: f64,
        quote: f64,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        self.ensure_ratio(base, quote)?;
        let new_base = self.reserve_base - base;
        let new_quote = self.reserve_quote - quote;
        ensure_reserve("base reserve after withdrawal", new_base)?;
        ensure_reserve("quote reserve after withdrawal", new_quote)?;

        let before = self.snapshot();
        self.reserve_base = new_base;
        self.reserve_quote = new_quote;
        self.invariant = self.reserve_base * self.reserve_quote;

        sink.record(PoolEvent::RemoveLiquidity {
            base,
            quote,
            before,
            after: self.snapshot(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * a.abs().max(b.abs())
    }

    #[test]
    fn base_swap_matches_closed_form() {
        let mut pool = Pool::new(10_000.0, 10_000.0).expect("valid pool");
        let out = pool.swap(Token::Base, 1_000.0).expect("swap succeeds");

        let expected = 10_000.0 - (10_000.0 * 10_000.0) / (10_000.0 + 1_000.0 * 0.997);
        assert!(close(out, expected, 1e-12), "got {out}, expected {expected}");
        assert!(close(out, 906.610_893_880_15, 1e-12));
        assert_eq!(pool.reserve_base(), 11_000.0);
    }

    #[test]
    fn quote_swap_pays_out_base() {
        let mut pool = Pool::new(8_000_000.0, 4_000.0).expect("valid pool");
        let preview = pool.quote_output(Token::Quote, 10.0).expect("preview");
        let out = pool.swap(Token::Quote, 10.0).expect("swap succeeds");

        assert_eq!(preview, out);
        assert!(close(out, 19_890.423_120_372, 1e-10));
        assert_eq!(pool.reserve_quote(), 4_010.0);
    }

    #[test]
    fn fee_accrues_into_invariant() {
        let mut pool = Pool::new(5_000.0, 2_500.0).expect("valid pool");
        let k0 = pool.invariant();
        pool.swap(Token::Quote, 100.0).expect("swap succeeds");
        assert!(pool.invariant() > k0);
        assert_eq!(pool.invariant(), pool.reserve_base() * pool.reserve_quote());
    }

    #[test]
    fn zero_fee_swap_is_exact_on_product_formula() {
        let mut pool = Pool::with_fee(1_000.0, 1_000.0, 0.0).expect("valid pool");
        let out = pool.swap(Token::Base, 1_000.0).expect("swap succeeds");
        assert!(close(out, 500.0, 1e-12));
    }

    #[test]
    fn rejects_non_positive_swap_without_mutation() {
        let mut pool = Pool::new(1_000.0, 1_000.0).expect("valid pool");
        let before = pool.clone();

        assert_eq!(pool.swap(Token::Base, 0.0), Err(ArbError::InvalidAmount(0.0)));
        assert_eq!(pool.swap(Token::Quote, -5.0), Err(ArbError::InvalidAmount(-5.0)));
        assert_eq!(pool, before);
    }

    #[test]
    fn unknown_symbol_is_invalid_token() {
        let mut pool = Pool::new(1_000.0, 1_000.0).expect("valid pool");
        assert!(matches!(
            pool.swap_symbol("BTC", 1.0),
            Err(ArbError::InvalidToken(symbol)) if symbol == "BTC"
        ));
        assert!(pool.swap_symbol("eth", 1.0).is_ok());
        assert_eq!("DAI".parse::<Token>(), Ok(Token::Base));
    }

    #[test]
    fn construction_rejects_bad_reserves_and_fees() {
        assert!(matches!(Pool::new(0.0, 1.0), Err(ArbError::InvalidReserves(_))));
        assert!(matches!(Pool::new(1.0, -1.0), Err(ArbError::InvalidReserves(_))));
        assert_eq!(Pool::with_fee(1.0, 1.0, 1.0), Err(ArbError::InvalidFeeRate(1.0)));
    }

    #[test]
    fn liquidity_round_trip_at_pool_ratio() {
        let mut pool = Pool::new(2_000.0, 1_000.0).expect("valid pool");
        pool.add_liquidity(200.0, 100.0).expect("ratio matches");
        assert_eq!(pool.reserve_base(), 2_200.0);
        assert_eq!(pool.invariant(), 2_200.0 * 1_100.0);

        pool.remove_liquidity(1_100.0, 550.0).expect("ratio matches");
        assert_eq!(pool.reserve_quote(), 550.0);
        assert_eq!(pool.invariant(), 1_100.0 * 550.0);
    }

    #[test]
    fn liquidity_ratio_mismatch_is_rejected() {
        let mut pool = Pool::new(2_000.0, 1_000.0).expect("valid pool");
        assert!(matches!(
            pool.add_liquidity(100.0, 100.0),
            Err(ArbError::LiquidityRatioMismatch { .. })
        ));
        assert_eq!(pool.reserve_base(), 2_000.0);
    }

    #[test]
    fn liquidity_ratio_tolerates_rounding_noise() {
        let mut pool = Pool::new(0.3, 0.1).expect("valid pool");
        // 0.1 + 0.2 != 0.3 in binary floating point.
        pool.add_liquidity(0.1 + 0.2, 0.1).expect("within tolerance");
    }

    #[test]
    fn non_positive_liquidity_is_a_ratio_mismatch() {
        let mut pool = Pool::new(2_000.0, 1_000.0).expect("valid pool");
        let before = pool.clone();

        assert!(matches!(
            pool.add_liquidity(0.0, 1.0),
            Err(ArbError::LiquidityRatioMismatch { .. })
        ));
        // Same ratio as the pool, but negative.
        assert!(matches!(
            pool.remove_liquidity(-2.0, -1.0),
            Err(ArbError::LiquidityRatioMismatch { .. })
        ));
        assert!(matches!(
            pool.add_liquidity(f64::NAN, 1.0),
            Err(ArbError::LiquidityRatioMismatch { .. })
        ));
        assert_eq!(pool, before);
    }

    #[test]
    fn dust_swap_never_shrinks_invariant() {
        let mut pool = Pool::new(8_000_000.0, 4_000.0).expect("valid pool");
        let k0 = pool.invariant();
        pool.swap(Token::Base, 1e-7).expect("swap succeeds");
        assert!(pool.invariant() >= k0);
    }

    #[test]
    fn overflowing_price_fails_validation() {
        assert!(matches!(
            ReservePair::new(1e-300, 1e300).validate("A"),
            Err(ArbError::InvalidReserves(_))
        ));
        assert!(matches!(
            ReservePair::new(1e300, 1e-300).validate("B"),
            Err(ArbError::InvalidReserves(_))
        ));
        assert!(ReservePair::new(8_000_000.0, 4_000.0).validate("A").is_ok());
    }

    #[test]
    fn draining_withdrawal_is_rejected() {
        let mut pool = Pool::new(2_000.0, 1_000.0).expect("valid pool");
        assert!(matches!(
            pool.remove_liquidity(2_000.0, 1_000.0),
            Err(ArbError::InvalidReserves(_))
        ));
        assert_eq!(pool.reserve_base(), 2_000.0);
    }

    #[test]
    fn sink_receives_swap_transition() {
        let mut pool = Pool::new(10_000.0, 10_000.0).expect("valid pool");
        let mut trail: Vec<PoolEvent> = Vec::new();
        let out = pool
            .swap_with(Token::Base, 1_000.0, &mut trail)
            .expect("swap succeeds");

        assert_eq!(trail.len(), 1);
        match &trail[0] {
            PoolEvent::Swap {
                input_token,
                amount_out,
                fee_retained,
                before,
                after,
                ..
            } => {
                assert_eq!(*input_token, Token::Base);
                assert_eq!(*amount_out, out);
                assert!(close(*fee_retained, 3.0, 1e-12));
                assert_eq!(before.invariant, 1e8);
                assert_eq!(after, &pool.snapshot());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}
