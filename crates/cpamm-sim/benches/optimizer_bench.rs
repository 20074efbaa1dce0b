//! Benchmarks for the arbitrage sizing pipeline.
//!
//! Uses seeded reserve scenarios so runs are comparable across machines.
//! Run with: `cargo bench --package cpamm-sim`

use cpamm_sim::bounds::{BoundStrategy, SearchBounds, DEFAULT_LOWER_BOUND};
use cpamm_sim::scenario::{ReserveRanges, Scenario, ScenarioGenerator};
use cpamm_sim::{arbitrage_profit, find_optimal_trade_with, ReservePair, SearchConfig};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

const POOL_A: ReservePair = ReservePair::new(8_000_000.0, 4_000.0);
const POOL_B: ReservePair = ReservePair::new(7_500_000.0, 5_000.0);

/// Draws `count` scenarios from the default DAI/ETH ranges.
fn sample_scenarios(seed: u64, count: usize) -> Vec<Scenario> {
    ScenarioGenerator::from_seed_u64(seed, ReserveRanges::default())
        .map(|generator| generator.take(count).collect())
        .unwrap_or_default()
}

/// Benchmark: one objective evaluation (two fresh pools, two swaps).
fn bench_profit_evaluation(c: &mut Criterion) {
    c.bench_function("profit_single_evaluation", |b| {
        b.iter(|| arbitrage_profit(black_box(294.0), black_box(POOL_A), black_box(POOL_B), -1.0))
    });
}

/// Benchmark: capital-weighted vs price-scaled bound derivation.
fn bench_bound_derivation(c: &mut Criterion) {
    let mut group = c.benchmark_group("bound_derivation");
    for strategy in [BoundStrategy::CapitalWeighted, BoundStrategy::PriceScaled] {
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter(|| {
                SearchBounds::derive(
                    strategy,
                    black_box(&POOL_A),
                    black_box(&POOL_B),
                    DEFAULT_LOWER_BOUND,
                )
            })
        });
    }
    group.finish();
}

/// Benchmark: full search on the reference pools.
fn bench_reference_search(c: &mut Criterion) {
    let config = SearchConfig::default();
    c.bench_function("find_optimal_trade_reference", |b| {
        b.iter(|| find_optimal_trade_with(black_box(POOL_A), black_box(POOL_B), &config))
    });
}

/// Benchmark: full search across 100 seeded random scenarios, per bound strategy.
fn bench_random_scenarios(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_optimal_trade_100_scenarios");
    for strategy in [BoundStrategy::CapitalWeighted, BoundStrategy::PriceScaled] {
        let config = SearchConfig {
            bounds: strategy,
            ..SearchConfig::default()
        };
        group.bench_function(format!("{strategy:?}"), |b| {
            b.iter_batched(
                || sample_scenarios(2024, 100),
                |scenarios| {
                    for scenario in scenarios {
                        let _ = find_optimal_trade_with(
                            black_box(scenario.reserves_a),
                            black_box(scenario.reserves_b),
                            &config,
                        );
                    }
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_profit_evaluation,
    bench_bound_derivation,
    bench_reference_search,
    bench_random_scenarios
);
criterion_main!(benches);
