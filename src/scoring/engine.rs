use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::context::{FeatureTag, MarketContext, UserInputs};
use crate::scoring::components::{score_components, ComponentScores};
use crate::scoring::config::EngineConfig;
use crate::scoring::weights::{Factor, WeightMap};
use crate::seasonal;
use crate::sensitivity;

/// Internal computation failures. These never escape `score_business`,
/// which degrades instead; they do surface from the batch operations
/// (Monte Carlo) where a failed unit is skipped or the whole run is empty.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("seasonal factor must be a positive finite number (got {0})")]
    InvalidSeasonalFactor(f64),
    #[error("score computation produced a non-finite value")]
    NonFiniteScore,
    #[error("no valid simulations ({attempted} trials attempted, all failed)")]
    NoValidSimulations { attempted: usize },
}

/// The answer to "should I open this business here".
///
/// Always well-formed: a failed computation yields the degraded form
/// (score 0, confidence 0, one explanatory reason) rather than an error.
/// Callers should read zero confidence as "insufficient data", not as a
/// missing result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoringResult {
    /// Final suitability score, 0-100, one decimal.
    pub score: f64,
    /// Trust in the score, 0.5-1.0 for computed results, 0.0 when degraded.
    pub confidence: f64,
    /// Strengths that drove the score up.
    pub reasons: Vec<String>,
    /// Hard signals against the site, independent of the weighting.
    pub warnings: Vec<String>,
    /// Score elasticity per factor (percent), from the weight perturbation
    /// analysis at the configured default adjustment.
    pub sensitivity: BTreeMap<Factor, f64>,
    /// Actionable next steps, at most five.
    pub recommendations: Vec<String>,
}

impl ScoringResult {
    /// Fallback result for an unrecoverable internal failure.
    pub fn degraded(error: &EngineError) -> Self {
        Self {
            score: 0.0,
            confidence: 0.0,
            reasons: vec![format!("insufficient data to score this site: {}", error)],
            warnings: Vec::new(),
            sensitivity: BTreeMap::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Combine component scores and weights into a 0-100 score plus confidence.
///
/// Only factors present in both maps contribute; the weighted sum is
/// normalized by the weight mass actually present, so a partial weight map
/// still lands on the 0-100 scale. No overlap at all scores 0. Confidence
/// penalizes weighted variance around the neutral 0.5 midpoint and is
/// floored at 0.5: variance alone is too weak a signal to report less than
/// coin-flip trust.
pub fn aggregate(scores: &ComponentScores, weights: &WeightMap) -> (f64, f64) {
    let mut weighted_sum = 0.0;
    let mut weight_mass = 0.0;
    let mut variance = 0.0;

    for (factor, weight) in weights {
        if let Some(score) = scores.get(factor) {
            weighted_sum += score * weight;
            weight_mass += weight;
            variance += weight * (score - 0.5).powi(2);
        }
    }

    if weight_mass <= 0.0 {
        return (0.0, 0.5);
    }

    let final_score = 100.0 * weighted_sum / weight_mass;
    let confidence = (1.0 - variance).max(0.5);
    (final_score, confidence)
}

/// Fallible scoring path used by everything that needs to observe failure
/// (Monte Carlo trials, scenario recomputation). `score_business` wraps it.
pub fn try_score(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
    weights: &WeightMap,
) -> Result<ScoringResult, EngineError> {
    if !ctx.seasonal_factor.is_finite() || ctx.seasonal_factor <= 0.0 {
        return Err(EngineError::InvalidSeasonalFactor(ctx.seasonal_factor));
    }

    let scores = score_components(config, business_id, inputs, ctx);
    let (raw_score, confidence) = aggregate(&scores, weights);
    if !raw_score.is_finite() || !confidence.is_finite() {
        return Err(EngineError::NonFiniteScore);
    }
    let score = round1(raw_score);

    let sensitivity =
        sensitivity::factor_elasticity(weights, &scores, config.sensitivity_adjustment);

    Ok(ScoringResult {
        score,
        confidence,
        reasons: build_reasons(&scores),
        warnings: build_warnings(business_id, ctx),
        sensitivity,
        recommendations: build_recommendations(business_id, &scores),
    })
}

/// Score a business at a site. Never fails; internal errors degrade.
pub fn score_business(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
    weights: &WeightMap,
) -> ScoringResult {
    match try_score(config, business_id, inputs, ctx, weights) {
        Ok(result) => result,
        Err(error) => {
            tracing::error!(business_id, %error, "scoring failed, returning degraded result");
            ScoringResult::degraded(&error)
        }
    }
}

/// First-generation screening score: five simple signals, no seasonal or
/// demographic passes. Cheap enough to run across a whole category list
/// before the full pipeline ranks the shortlist.
pub fn quick_score(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
    weights: Option<&WeightMap>,
) -> f64 {
    let weights = weights.unwrap_or(&config.quick_weights);

    let mut scores = ComponentScores::new();
    scores.insert(
        Factor::Customer,
        config.customer_affinity(business_id, inputs.customer_target),
    );
    scores.insert(
        Factor::Competition,
        (1.0 - f64::from(ctx.competitors(business_id)) / 10.0).max(0.0),
    );
    scores.insert(
        Factor::Safety,
        f64::from((ctx.feature(FeatureTag::Police) + ctx.feature(FeatureTag::Hospital)).min(5))
            / 5.0,
    );
    scores.insert(
        Factor::Transport,
        f64::from(ctx.feature(FeatureTag::BusStop).min(5)) / 5.0,
    );
    scores.insert(
        Factor::Landmark,
        f64::from(
            (ctx.feature(FeatureTag::School)
                + ctx.feature(FeatureTag::Office)
                + ctx.feature(FeatureTag::Park))
            .min(10),
        ) / 10.0,
    );

    round1(aggregate(&scores, weights).0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn build_reasons(scores: &ComponentScores) -> Vec<String> {
    let mut reasons = Vec::new();
    let get = |factor: Factor| scores.get(&factor).copied().unwrap_or(0.0);

    if get(Factor::Competition) > 0.7 {
        reasons.push("Few direct competitors in the area".to_string());
    }
    if get(Factor::Safety) > 0.6 {
        reasons.push("Safe surroundings (police and hospital coverage)".to_string());
    }
    if get(Factor::Customer) > 0.5 {
        reasons.push("Good fit for the target customer group".to_string());
    }
    if get(Factor::Transport) > 0.5 {
        reasons.push("Easy to reach by public transport".to_string());
    }
    if get(Factor::Landmark) > 0.5 {
        reasons.push("Close to traffic anchors (schools, offices, parks)".to_string());
    }
    if get(Factor::MarketPotential) > 0.6 {
        reasons.push("Area shows real growth potential".to_string());
    }
    if reasons.is_empty() {
        reasons.push("No standout strengths for this location".to_string());
    }
    reasons
}

fn build_warnings(business_id: &str, ctx: &MarketContext) -> Vec<String> {
    let mut warnings = Vec::new();

    let competitors = ctx.competitors(business_id);
    if competitors >= 10 {
        warnings.push(format!(
            "Crowded market: {} existing {} venues nearby",
            competitors, business_id
        ));
    }
    if ctx.feature(FeatureTag::Police) + ctx.feature(FeatureTag::Hospital) == 0 {
        warnings.push(
            "No safety infrastructure (police or hospital) within the search radius".to_string(),
        );
    }
    if ctx.feature(FeatureTag::BusStop) == 0 {
        warnings.push("No bus stop within the search radius".to_string());
    }
    warnings
}

fn build_recommendations(business_id: &str, scores: &ComponentScores) -> Vec<String> {
    let mut recommendations = Vec::new();
    let get = |factor: Factor| scores.get(&factor).copied().unwrap_or(0.0);

    if get(Factor::Competition) < 0.3 {
        recommendations
            .push("Expect a crowded market; plan a clear differentiator before committing".to_string());
    }
    if get(Factor::FinancialViability) < 0.4 {
        recommendations.push(
            "Margins look thin here; model rent and operating costs before signing a lease"
                .to_string(),
        );
    }
    if get(Factor::Transport) < 0.3 {
        recommendations
            .push("Weak transport links; consider delivery channels or online ordering".to_string());
    }
    if get(Factor::Customer) < 0.4 {
        recommendations
            .push("The target segment is a poor fit; revisit the customer mix or the concept".to_string());
    }
    if seasonal::seasonal_amplitude(business_id) >= 0.7 {
        recommendations.push(format!(
            "Demand for {} swings with the season (peak around month {}); budget for the slow months",
            business_id,
            seasonal::peak_month(business_id)
        ));
    }
    recommendations.truncate(5);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CustomerSegment, RawContext};

    fn context_from(
        osm: &[(FeatureTag, u32)],
        categories: &[(&str, u32)],
        segment: CustomerSegment,
    ) -> MarketContext {
        let raw = RawContext {
            osm: osm.iter().copied().collect(),
            category_counts: categories
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        };
        // Month 5 keeps the general calendar neutral.
        MarketContext::from_raw(raw, segment, 5)
    }

    #[test]
    fn test_quick_score_student_milk_tea() {
        // weights {customer .30, competition .25, safety .15, transport .15,
        // landmark .15}; student x milk_tea affinity 1.0; two competitors;
        // police 1, bus 3, school 2 + office 1.
        let config = EngineConfig::default();
        let inputs = UserInputs {
            customer_target: CustomerSegment::Student,
            price_level: 2,
        };
        let ctx = context_from(
            &[
                (FeatureTag::Police, 1),
                (FeatureTag::Hospital, 0),
                (FeatureTag::BusStop, 3),
                (FeatureTag::Subway, 0),
                (FeatureTag::School, 2),
                (FeatureTag::Office, 1),
                (FeatureTag::Park, 0),
            ],
            &[("milk_tea", 2)],
            CustomerSegment::Student,
        );

        let score = quick_score(&config, "milk_tea", &inputs, &ctx, None);
        // 100 * (1.0*.30 + 0.8*.25 + 0.2*.15 + 0.6*.15 + 0.3*.15) = 66.5
        assert_eq!(score, 66.5);
    }

    #[test]
    fn test_aggregate_normalizes_partial_weight_maps() {
        let mut scores = ComponentScores::new();
        scores.insert(Factor::Customer, 1.0);
        scores.insert(Factor::Safety, 0.0);

        let mut weights = WeightMap::new();
        weights.insert(Factor::Customer, 0.25);
        weights.insert(Factor::Safety, 0.25);
        // Half the weight mass is missing from the scores map entirely.
        weights.insert(Factor::MarketPotential, 0.5);

        let (score, confidence) = aggregate(&scores, &weights);
        assert_eq!(score, 50.0);
        assert!((0.5..=1.0).contains(&confidence));
    }

    #[test]
    fn test_aggregate_no_overlap_scores_zero() {
        let scores = ComponentScores::new();
        let mut weights = WeightMap::new();
        weights.insert(Factor::Customer, 1.0);
        let (score, confidence) = aggregate(&scores, &weights);
        assert_eq!(score, 0.0);
        assert_eq!(confidence, 0.5);
    }

    #[test]
    fn test_confidence_floor() {
        // Extreme scores maximize variance; confidence must not drop
        // below 0.5 anyway.
        let mut scores = ComponentScores::new();
        let mut weights = WeightMap::new();
        for factor in Factor::ALL {
            scores.insert(factor, 1.0);
            weights.insert(factor, 0.125);
        }
        let (_, confidence) = aggregate(&scores, &weights);
        assert!(confidence >= 0.5);
        assert!(confidence <= 1.0);
    }

    #[test]
    fn test_score_business_is_idempotent() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let ctx = context_from(
            &[
                (FeatureTag::Police, 1),
                (FeatureTag::BusStop, 2),
                (FeatureTag::School, 1),
                (FeatureTag::Residential, 8),
            ],
            &[("cafe", 3)],
            CustomerSegment::General,
        );
        let weights = crate::scoring::weights::resolve_weights(&config, "cafe", None, None);

        let first = score_business(&config, "cafe", &inputs, &ctx, &weights);
        let second = score_business(&config, "cafe", &inputs, &ctx, &weights);
        assert_eq!(first, second);
        assert!((0.0..=100.0).contains(&first.score));
        assert!((0.5..=1.0).contains(&first.confidence));
    }

    #[test]
    fn test_unknown_business_never_fails() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let ctx = context_from(&[(FeatureTag::BusStop, 1)], &[], CustomerSegment::General);
        let weights =
            crate::scoring::weights::resolve_weights(&config, "unicorn_shop", None, None);
        let result = score_business(&config, "unicorn_shop", &inputs, &ctx, &weights);
        assert!((0.0..=100.0).contains(&result.score));
        assert!(result.confidence >= 0.5);
    }

    #[test]
    fn test_degraded_result_on_bad_seasonal_factor() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let mut ctx = context_from(&[], &[], CustomerSegment::General);
        ctx.seasonal_factor = 0.0;
        let weights = crate::scoring::weights::resolve_weights(&config, "cafe", None, None);

        let result = score_business(&config, "cafe", &inputs, &ctx, &weights);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.confidence, 0.0);
        assert_eq!(result.reasons.len(), 1);
        assert!(result.reasons[0].contains("insufficient data"));
        assert!(result.recommendations.is_empty());
    }

    #[test]
    fn test_warnings_flag_bare_areas() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let ctx = context_from(&[], &[("cafe", 11)], CustomerSegment::General);
        let weights = crate::scoring::weights::resolve_weights(&config, "cafe", None, None);
        let result = score_business(&config, "cafe", &inputs, &ctx, &weights);
        assert!(result.warnings.iter().any(|w| w.contains("Crowded market")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("No safety infrastructure")));
        assert!(result.warnings.iter().any(|w| w.contains("No bus stop")));
    }

    #[test]
    fn test_recommendations_capped_at_five() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        // Bare context drives most advice paths at once.
        let ctx = context_from(&[], &[("ice_cream", 12)], CustomerSegment::General);
        let weights =
            crate::scoring::weights::resolve_weights(&config, "ice_cream", None, None);
        let result = score_business(&config, "ice_cream", &inputs, &ctx, &weights);
        assert!(result.recommendations.len() <= 5);
        assert!(!result.recommendations.is_empty());
    }
}
