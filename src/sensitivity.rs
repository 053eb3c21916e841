//! Weight-sensitivity analysis.
//!
//! Answers "which lever moves the score": each factor's weight is bumped by
//! a relative adjustment, the map renormalized, and the aggregate recomputed
//! with the component scores frozen. Components are deliberately not
//! recomputed; only the weighting changes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::scoring::components::ComponentScores;
use crate::scoring::engine::aggregate;
use crate::scoring::weights::{Factor, WeightMap};

/// Sensitivity band for ranking levers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityBand {
    High,
    Medium,
    Low,
}

impl SensitivityBand {
    pub fn classify(percent: f64) -> Self {
        if percent > 30.0 {
            SensitivityBand::High
        } else if percent >= 10.0 {
            SensitivityBand::Medium
        } else {
            SensitivityBand::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitivityBand::High => "high",
            SensitivityBand::Medium => "medium",
            SensitivityBand::Low => "low",
        }
    }
}

/// Full report for the sensitivity operation.
#[derive(Debug, Clone, Serialize)]
pub struct SensitivityReport {
    pub base_score: f64,
    /// Relative weight adjustment the analysis ran with.
    pub adjustment: f64,
    /// Elasticity percent per factor.
    pub factors: BTreeMap<Factor, f64>,
    /// Factors ordered most-sensitive first.
    pub ranked: Vec<(Factor, f64, SensitivityBand)>,
}

/// Elasticity percent per factor present in `weights`.
///
/// For each factor: scale its weight by `(1 + adjustment)`, renormalize the
/// whole map, re-aggregate against the same `scores`, and report
/// `|modified - base| / base * 100`. A zero base score reports 0 for every
/// factor rather than dividing by zero.
pub fn factor_elasticity(
    weights: &WeightMap,
    scores: &ComponentScores,
    adjustment: f64,
) -> BTreeMap<Factor, f64> {
    let (base_score, _) = aggregate(scores, weights);
    let mut elasticity = BTreeMap::new();

    for factor in weights.keys() {
        let percent = if base_score == 0.0 {
            0.0
        } else {
            let mut perturbed = weights.clone();
            if let Some(weight) = perturbed.get_mut(factor) {
                *weight *= 1.0 + adjustment;
            }
            let total: f64 = perturbed.values().sum();
            if total > 0.0 {
                for value in perturbed.values_mut() {
                    *value /= total;
                }
            }
            let (modified, _) = aggregate(scores, &perturbed);
            (modified - base_score).abs() / base_score * 100.0
        };
        elasticity.insert(*factor, percent);
    }
    elasticity
}

/// Build the ranked report around `factor_elasticity`.
pub fn analyze(
    weights: &WeightMap,
    scores: &ComponentScores,
    adjustment: f64,
) -> SensitivityReport {
    let (base_score, _) = aggregate(scores, weights);
    let factors = factor_elasticity(weights, scores, adjustment);

    let mut ranked: Vec<(Factor, f64, SensitivityBand)> = factors
        .iter()
        .map(|(factor, percent)| (*factor, *percent, SensitivityBand::classify(*percent)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    SensitivityReport {
        base_score,
        adjustment,
        factors,
        ranked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn even_weights() -> WeightMap {
        Factor::ALL.iter().map(|f| (*f, 0.125)).collect()
    }

    #[test]
    fn test_uniform_scores_have_zero_elasticity() {
        // If every component sits at the same value, reweighting cannot
        // move the aggregate.
        let scores: ComponentScores = Factor::ALL.iter().map(|f| (*f, 0.6)).collect();
        let elasticity = factor_elasticity(&even_weights(), &scores, 0.2);
        for percent in elasticity.values() {
            assert!(percent.abs() < 1e-9);
        }
    }

    #[test]
    fn test_outlier_factor_is_most_sensitive() {
        let mut scores: ComponentScores = Factor::ALL.iter().map(|f| (*f, 0.5)).collect();
        scores.insert(Factor::Competition, 1.0);

        let report = analyze(&even_weights(), &scores, 0.2);
        assert_eq!(report.ranked[0].0, Factor::Competition);
        assert!(report.ranked[0].1 > 0.0);
    }

    #[test]
    fn test_zero_base_score_reports_zero() {
        let scores: ComponentScores = Factor::ALL.iter().map(|f| (*f, 0.0)).collect();
        let elasticity = factor_elasticity(&even_weights(), &scores, 0.2);
        assert!(elasticity.values().all(|p| *p == 0.0));
    }

    #[test]
    fn test_bands() {
        assert_eq!(SensitivityBand::classify(45.0), SensitivityBand::High);
        assert_eq!(SensitivityBand::classify(15.0), SensitivityBand::Medium);
        assert_eq!(SensitivityBand::classify(3.0), SensitivityBand::Low);
    }

    #[test]
    fn test_only_weighted_factors_reported() {
        let mut weights = WeightMap::new();
        weights.insert(Factor::Customer, 0.6);
        weights.insert(Factor::Safety, 0.4);
        let mut scores = ComponentScores::new();
        scores.insert(Factor::Customer, 0.9);
        scores.insert(Factor::Safety, 0.2);

        let elasticity = factor_elasticity(&weights, &scores, 0.2);
        assert_eq!(elasticity.len(), 2);
        assert!(elasticity.contains_key(&Factor::Customer));
        assert!(elasticity.contains_key(&Factor::Safety));
    }
}
