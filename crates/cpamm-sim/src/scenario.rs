//! Reproducible random reserve scenarios.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{ArbError, Result};
use crate::pool::ReservePair;

/// Half-open sampling ranges for each side of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReserveRanges {
    pub base: (f64, f64),
    pub quote: (f64, f64),
}

impl Default for ReserveRanges {
    /// DAI/ETH-sized pools: 7–8M base, 3–5k quote.
    fn default() -> Self {
        Self {
            base: (7_000_000.0, 8_000_000.0),
            quote: (3_000.0, 5_000.0),
        }
    }
}

impl ReserveRanges {
    pub fn validate(&self) -> Result<()> {
        for (label, (low, high)) in [("base", self.base), ("quote", self.quote)] {
            if !(low.is_finite() && high.is_finite() && low > 0.0 && low < high) {
                return Err(ArbError::InvalidConfig(format!(
                    "{label} range [{low}, {high}) must be positive and non-empty"
                )));
            }
        }
        Ok(())
    }
}

/// Two pools drawn from the same ranges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Scenario {
    pub reserves_a: ReservePair,
    pub reserves_b: ReservePair,
}

/// Seeded reserve sampler. Equal seeds give equal scenario streams.
#[derive(Clone, Debug)]
pub struct ScenarioGenerator {
    rng: StdRng,
    ranges: ReserveRanges,
    seed: u64,
}

impl ScenarioGenerator {
    pub fn from_seed_u64(seed: u64, ranges: ReserveRanges) -> Result<Self> {
        ranges.validate()?;
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            ranges,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_pair(&mut self) -> ReservePair {
        let (base_low, base_high) = self.ranges.base;
        let (quote_low, quote_high) = self.ranges.quote;
        ReservePair::new(
            self.rng.gen_range(base_low..base_high),
            self.rng.gen_range(quote_low..quote_high),
        )
    }

    pub fn next_scenario(&mut self) -> Scenario {
        Scenario {
            reserves_a: self.next_pair(),
            reserves_b: self.next_pair(),
        }
    }
}

impl Iterator for ScenarioGenerator {
    type Item = Scenario;

    fn next(&mut self) -> Option<Scenario> {
        Some(self.next_scenario())
    }
}
