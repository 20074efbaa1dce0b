//! Typed failures for pool operations and the arbitrage search.
//!
//! Every variant is a precondition failure: detected synchronously before any
//! state is mutated and never retried internally.

use thiserror::Error;

/// Errors raised by [`crate::pool::Pool`] and the arbitrage search.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArbError {
    /// A reserve was non-positive or non-finite, or an operation would leave one so.
    #[error("invalid reserves: {0}")]
    InvalidReserves(String),

    /// Token identifier does not name either side of the pool.
    #[error("invalid token identifier '{0}'; expected base/quote (DAI/ETH)")]
    InvalidToken(String),

    /// Swap or trade amount was not strictly positive.
    #[error("invalid amount {0}: must be strictly positive")]
    InvalidAmount(f64),

    /// Liquidity change does not preserve the pool's base/quote ratio.
    #[error("liquidity ratio {provided} does not match pool ratio {expected}")]
    LiquidityRatioMismatch { provided: f64, expected: f64 },

    /// Both pools quote exactly the same price.
    #[error("no arbitrage opportunity available: both pools quote {price}")]
    NoArbitrage { price: f64 },

    /// Fee rate outside `[0, 1)`.
    #[error("invalid fee rate {0}: must lie in [0, 1)")]
    InvalidFeeRate(f64),

    /// Search configuration that cannot drive a bounded search.
    #[error("invalid search config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ArbError>;

/// Rejects any reserve that is non-positive, NaN or infinite.
pub(crate) fn ensure_reserve(label: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArbError::InvalidReserves(format!(
            "{label} = {value}; reserves must be finite and strictly positive"
        )))
    }
}

/// Rejects any amount that is non-positive, NaN or infinite.
pub(crate) fn ensure_amount(value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ArbError::InvalidAmount(value))
    }
}
