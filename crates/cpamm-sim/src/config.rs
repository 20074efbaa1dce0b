//! Tunables for the trade-size search.

use serde::{Deserialize, Serialize};

use crate::bounds::{BoundStrategy, DEFAULT_LOWER_BOUND};
use crate::error::{ArbError, Result};
use crate::optimizer::{DEFAULT_MAX_EVALUATIONS, DEFAULT_X_TOLERANCE};
use crate::pool::DEFAULT_FEE_RATE;

/// Search configuration. Missing fields take their defaults when
/// deserialized, so `{}` is a valid config file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Swap fee applied on both pools.
    pub fee_rate: f64,
    /// Smallest trade size tried; must be strictly positive.
    pub lower_bound: f64,
    /// Absolute tolerance on the trade size at convergence.
    pub x_tolerance: f64,
    /// Hard cap on objective evaluations.
    pub max_evaluations: usize,
    /// Upper-bound heuristic.
    pub bounds: BoundStrategy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fee_rate: DEFAULT_FEE_RATE,
            lower_bound: DEFAULT_LOWER_BOUND,
            x_tolerance: DEFAULT_X_TOLERANCE,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
            bounds: BoundStrategy::default(),
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(ArbError::InvalidFeeRate(self.fee_rate));
        }
        if !(self.lower_bound.is_finite() && self.lower_bound > 0.0) {
            return Err(ArbError::InvalidConfig(format!(
                "lower_bound must be finite and > 0, got {}",
                self.lower_bound
            )));
        }
        if !(self.x_tolerance.is_finite() && self.x_tolerance > 0.0) {
            return Err(ArbError::InvalidConfig(format!(
                "x_tolerance must be finite and > 0, got {}",
                self.x_tolerance
            )));
        }
        if self.max_evaluations == 0 {
            return Err(ArbError::InvalidConfig(
                "max_evaluations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
