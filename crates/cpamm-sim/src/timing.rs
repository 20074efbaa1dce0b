//! Wall-clock timing of the trade-size search over many scenarios.

use std::time::Instant;

use serde::Serialize;

use crate::config::SearchConfig;
use crate::optimizer::optimize_trade;
use crate::scenario::{Scenario, ScenarioGenerator};

/// Summary statistics of a sample, in the shape of a `describe()` table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TimingStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1); zero for fewer than two samples.
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl TimingStats {
    /// Empty input yields all-zero statistics.
    pub fn from_samples(samples: &[f64]) -> Self {
        let count = samples.len();
        if count == 0 {
            return Self {
                count,
                mean: 0.0,
                std: 0.0,
                min: 0.0,
                p25: 0.0,
                p50: 0.0,
                p75: 0.0,
                max: 0.0,
            };
        }

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            0.0
        } else {
            let var = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.50),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// One timed search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BenchmarkSample {
    pub scenario: Scenario,
    pub seconds: f64,
    pub evaluations: usize,
    pub profit: f64,
}

/// Aggregate over a benchmark run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BenchmarkSummary {
    pub seed: u64,
    pub samples: Vec<BenchmarkSample>,
    /// Scenarios the search rejected (equal prices).
    pub skipped: usize,
    /// Samples with strictly positive profit.
    pub profitable: usize,
    pub seconds: TimingStats,
    pub evaluations: TimingStats,
}

/// Times [`optimize_trade`] on `count` scenarios drawn from `generator`.
///
/// `on_sample` runs after every scenario, timed or skipped.
pub fn run_benchmark(
    generator: &mut ScenarioGenerator,
    count: usize,
    config: &SearchConfig,
    mut on_sample: impl FnMut(Option<&BenchmarkSample>),
) -> BenchmarkSummary {
    let mut samples = Vec::with_capacity(count);
    let mut skipped = 0;

    for scenario in generator.by_ref().take(count) {
        let started = Instant::now();
        let outcome = optimize_trade(scenario.reserves_a, scenario.reserves_b, config);
        let seconds = started.elapsed().as_secs_f64();

        match outcome {
            Ok(result) => {
                samples.push(BenchmarkSample {
                    scenario,
                    seconds,
                    evaluations: result.evaluations,
                    profit: result.profit,
                });
                on_sample(samples.last());
            }
            Err(error) => {
                tracing::debug!(%error, ?scenario, "scenario skipped");
                skipped += 1;
                on_sample(None);
            }
        }
    }

    let times: Vec<f64> = samples.iter().map(|sample| sample.seconds).collect();
    let evals: Vec<f64> = samples
        .iter()
        .map(|sample| sample.evaluations as f64)
        .collect();
    let profitable = samples.iter().filter(|sample| sample.profit > 0.0).count();

    BenchmarkSummary {
        seed: generator.seed(),
        seconds: TimingStats::from_samples(&times),
        evaluations: TimingStats::from_samples(&evals),
        samples,
        skipped,
        profitable,
    }
}
