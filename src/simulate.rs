//! Monte Carlo uncertainty simulation.
//!
//! Every trial clones the context, perturbs each feature and category count
//! by an independent uniform factor, and replays the full scoring pipeline.
//! Trial i derives its RNG from `base_seed + i`, so a fixed base seed
//! reproduces the whole distribution no matter how rayon schedules the
//! trials across worker threads.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::context::{MarketContext, UserInputs};
use crate::rules::RiskLevel;
use crate::scoring::config::EngineConfig;
use crate::scoring::engine::{try_score, EngineError};
use crate::scoring::weights::WeightMap;

/// Distribution statistics over the trial scores.
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloStats {
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p5: f64,
    pub p25: f64,
    pub p75: f64,
    pub p95: f64,
}

/// Risk read derived from the distribution shape.
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloRisk {
    pub risk_level: RiskLevel,
    /// Coefficient of variation (std_dev / mean).
    pub volatility: f64,
    /// How far below baseline the 5th percentile lands.
    pub downside_risk: f64,
    /// How far above baseline the 95th percentile lands.
    pub upside_potential: f64,
    /// Upside over downside; `None` when there is no downside at all.
    pub risk_reward_ratio: Option<f64>,
}

/// Full simulation report.
#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloSummary {
    pub statistics: MonteCarloStats,
    pub baseline_score: f64,
    /// Empirical share of trials scoring below the baseline.
    pub probability_below_baseline: f64,
    /// Empirical share of trials at or above the success threshold.
    pub probability_success: f64,
    /// The success threshold trials are compared against.
    pub success_threshold: f64,
    /// (p5, p95) band.
    pub confidence_interval_90: (f64, f64),
    pub risk: MonteCarloRisk,
    pub valid_trials: usize,
    pub requested_trials: usize,
}

/// Run the simulation. `seed` pins the distribution for reproducible runs;
/// `None` draws a fresh base seed from thread entropy.
///
/// Individual trials that fail to score are skipped. If every trial fails,
/// the run fails closed with `NoValidSimulations` instead of producing
/// statistics over nothing.
pub fn simulate(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
    weights: &WeightMap,
    runs: usize,
    seed: Option<u64>,
) -> Result<MonteCarloSummary, EngineError> {
    let baseline = try_score(config, business_id, inputs, ctx, weights)?.score;
    let base_seed = seed.unwrap_or_else(|| rand::thread_rng().gen());

    let mut scores: Vec<f64> = (0..runs)
        .into_par_iter()
        .filter_map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(i as u64));
            let trial_ctx = perturb(config, ctx, &mut rng);
            try_score(config, business_id, inputs, &trial_ctx, weights)
                .ok()
                .map(|result| result.score)
        })
        .collect();

    if scores.is_empty() {
        return Err(EngineError::NoValidSimulations { attempted: runs });
    }

    scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let statistics = stats(&scores);

    let n = scores.len() as f64;
    let below = scores.iter().filter(|s| **s < baseline).count() as f64;
    let successes = scores
        .iter()
        .filter(|s| **s >= config.simulation.success_threshold)
        .count() as f64;

    let risk = assess_risk(&statistics, baseline);

    Ok(MonteCarloSummary {
        confidence_interval_90: (statistics.p5, statistics.p95),
        probability_below_baseline: below / n,
        probability_success: successes / n,
        success_threshold: config.simulation.success_threshold,
        baseline_score: baseline,
        risk,
        valid_trials: scores.len(),
        requested_trials: runs,
        statistics,
    })
}

/// Clone and jitter a context: feature counts move within the configured
/// OSM jitter band, category counts within the (wider) category band.
fn perturb(config: &EngineConfig, ctx: &MarketContext, rng: &mut ChaCha8Rng) -> MarketContext {
    let mut trial = ctx.clone();

    let osm_jitter = config.simulation.osm_jitter;
    for count in trial.osm_counts.values_mut() {
        *count = jitter_count(*count, rng.gen_range(-osm_jitter..=osm_jitter));
    }

    let category_jitter = config.simulation.category_jitter;
    for count in trial.category_counts.values_mut() {
        *count = jitter_count(*count, rng.gen_range(-category_jitter..=category_jitter));
    }
    trial
}

fn jitter_count(count: u32, variation: f64) -> u32 {
    let scaled = (f64::from(count) * (1.0 + variation)).round();
    if scaled <= 0.0 {
        0
    } else {
        scaled as u32
    }
}

fn stats(sorted: &[f64]) -> MonteCarloStats {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let variance = sorted.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;

    MonteCarloStats {
        mean,
        median: sorted[n / 2],
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[n - 1],
        p5: percentile(sorted, 0.05),
        p25: percentile(sorted, 0.25),
        p75: percentile(sorted, 0.75),
        p95: percentile(sorted, 0.95),
    }
}

/// Sorted-array index percentile, no interpolation.
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let idx = ((sorted.len() as f64) * q) as usize;
    sorted[idx.min(sorted.len() - 1)]
}

fn assess_risk(statistics: &MonteCarloStats, baseline: f64) -> MonteCarloRisk {
    let volatility = if statistics.mean > 0.0 {
        statistics.std_dev / statistics.mean
    } else {
        1.0
    };

    let risk_level = if volatility < 0.1 {
        RiskLevel::VeryLow
    } else if volatility < 0.2 {
        RiskLevel::Low
    } else if volatility < 0.3 {
        RiskLevel::Medium
    } else if volatility < 0.5 {
        RiskLevel::High
    } else {
        RiskLevel::VeryHigh
    };

    let downside_risk = (baseline - statistics.p5).max(0.0);
    let upside_potential = (statistics.p95 - baseline).max(0.0);
    let risk_reward_ratio = if downside_risk > 0.0 {
        Some(upside_potential / downside_risk)
    } else {
        None
    };

    MonteCarloRisk {
        risk_level,
        volatility,
        downside_risk,
        upside_potential,
        risk_reward_ratio,
    }
}
