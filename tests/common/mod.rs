//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use cpamm_sim::scenario::{ReserveRanges, Scenario, ScenarioGenerator};
use cpamm_sim::ReservePair;

/// Pool A of the reference scenario: price 0.0005 ETH per DAI.
pub const POOL_A: ReservePair = ReservePair::new(8_000_000.0, 4_000.0);

/// Pool B of the reference scenario: price ≈ 0.000667 ETH per DAI.
pub const POOL_B: ReservePair = ReservePair::new(7_500_000.0, 5_000.0);

/// Seeded DAI/ETH-sized scenarios.
///
/// # Panics
/// Panics if the default ranges are rejected (they never are).
pub fn seeded_scenarios(seed: u64, count: usize) -> Vec<Scenario> {
    ScenarioGenerator::from_seed_u64(seed, ReserveRanges::default())
        .expect("default ranges are valid")
        .take(count)
        .collect()
}

/// Relative closeness check with a readable failure message.
pub fn assert_close(actual: f64, expected: f64, rel: f64) {
    let scale = actual.abs().max(expected.abs()).max(f64::MIN_POSITIVE);
    assert!(
        (actual - expected).abs() <= rel * scale,
        "expected {expected}, got {actual} (rel tol {rel})"
    );
}
