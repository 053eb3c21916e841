use std::collections::BTreeMap;

use crate::context::{FeatureTag, MarketContext, UserInputs};
use crate::scoring::config::{business_category, BusinessCategory, EngineConfig};
use crate::scoring::weights::Factor;

/// Per-factor sub-scores, each clamped to [0, 1].
pub type ComponentScores = BTreeMap<Factor, f64>;

/// Compute the eight component scores for a business at a site.
///
/// Order of passes: raw formulas, seasonal multiplier, business-category
/// modifiers, recorded scenario adjustments, final clamp. Every returned
/// value lands in [0, 1].
pub fn score_components(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
) -> ComponentScores {
    let mut scores = ComponentScores::new();
    scores.insert(Factor::Customer, customer_score(config, business_id, inputs, ctx));
    scores.insert(Factor::Competition, competition_score(config, business_id, ctx));
    scores.insert(Factor::Safety, safety_score(ctx));
    scores.insert(Factor::Transport, transport_score(ctx));
    scores.insert(Factor::Landmark, landmark_score(ctx));
    scores.insert(Factor::MarketPotential, market_potential_score(ctx));
    scores.insert(
        Factor::OperationalFeasibility,
        operational_feasibility_score(ctx),
    );
    scores.insert(
        Factor::FinancialViability,
        financial_viability_score(config, business_id, inputs, ctx),
    );

    for value in scores.values_mut() {
        *value *= ctx.seasonal_factor;
    }

    apply_category_modifiers(business_category(business_id), &mut scores);

    // Scenario deltas that have no count-level materialization land here as
    // abstract multipliers on their factor.
    for (factor, delta) in &ctx.scenario_adjustments {
        if let Some(score) = scores.get_mut(factor) {
            *score *= 1.0 + delta;
        }
    }

    for value in scores.values_mut() {
        *value = value.clamp(0.0, 1.0);
    }
    scores
}

fn customer_score(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
) -> f64 {
    let affinity = config.customer_affinity(business_id, inputs.customer_target);
    let demographic = config.demographic_multiplier(business_id, ctx.income_level);
    (affinity * demographic).clamp(0.0, 1.0)
}

fn competition_score(config: &EngineConfig, business_id: &str, ctx: &MarketContext) -> f64 {
    let density_factor = (ctx.population_density / 1500.0).clamp(0.4, 2.0);
    let income_factor = ctx.income_level.capacity_factor();
    let capacity = config.capacity_ratio(business_id) * density_factor * income_factor;
    if capacity <= 0.0 {
        // No room in the market means no score to hand out.
        return 0.0;
    }

    let saturation = f64::from(ctx.competitors(business_id)) / capacity;
    // Smooth decreasing curve centered at 50% saturation.
    let curve = 1.0 / (1.0 + (5.0 * (saturation - 0.5)).exp());
    let intensity = business_category(business_id).competition_intensity();
    (curve * intensity).clamp(0.0, 1.0)
}

fn safety_score(ctx: &MarketContext) -> f64 {
    let coverage = ctx.feature(FeatureTag::Police) + ctx.feature(FeatureTag::Hospital);
    f64::from(coverage.min(3)) / 3.0
}

fn transport_score(ctx: &MarketContext) -> f64 {
    let connectivity = ctx.feature(FeatureTag::BusStop) + 2 * ctx.feature(FeatureTag::Subway);
    f64::from(connectivity.min(5)) / 5.0
}

fn landmark_score(ctx: &MarketContext) -> f64 {
    let anchors = ctx.feature(FeatureTag::School)
        + ctx.feature(FeatureTag::Office)
        + ctx.feature(FeatureTag::Park);
    f64::from(anchors.min(10)) / 10.0
}

fn market_potential_score(ctx: &MarketContext) -> f64 {
    let density_signal = (ctx.population_density / 3000.0).clamp(0.0, 1.0);
    let income_signal = ctx.income_level.signal();
    let infrastructure = ctx.feature(FeatureTag::BusStop)
        + ctx.feature(FeatureTag::Subway)
        + ctx.feature(FeatureTag::Office);
    let infrastructure_signal = f64::from(infrastructure.min(10)) / 10.0;
    (density_signal + income_signal + infrastructure_signal) / 3.0
}

fn operational_feasibility_score(ctx: &MarketContext) -> f64 {
    let labor = f64::from(ctx.feature(FeatureTag::Residential).min(20)) / 20.0;
    let supply_chain =
        f64::from((ctx.feature(FeatureTag::BusStop) + ctx.feature(FeatureTag::Subway)).min(6))
            / 6.0;
    // Existing businesses are a proxy for how workable the area's
    // permitting and logistics already are.
    let regulatory = f64::from(ctx.total_businesses().min(30)) / 30.0;
    (labor + supply_chain + regulatory) / 3.0
}

fn financial_viability_score(
    config: &EngineConfig,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
) -> f64 {
    let income_signal = ctx.income_level.signal();
    let overpricing = f64::from(inputs.price_level.saturating_sub(ctx.income_level.price_band()));
    let price_alignment = (1.0 - 0.15 * overpricing).max(0.55);
    let revenue_potential =
        (ctx.foot_traffic_score * (0.5 + 0.5 * income_signal) * price_alignment).clamp(0.0, 1.0);

    let rent_score = f64::from(4 - ctx.rent_level.clamp(1, 4)) / 3.0;
    let margin = config.profit_margin(business_id);

    (0.4 * revenue_potential + 0.3 * rent_score + 0.3 * margin).min(1.0)
}

fn apply_category_modifiers(category: BusinessCategory, scores: &mut ComponentScores) {
    let modifiers: &[(Factor, f64)] = match category {
        BusinessCategory::FoodBeverage => &[(Factor::Transport, 1.2), (Factor::Landmark, 1.1)],
        BusinessCategory::Service => &[(Factor::Transport, 0.9), (Factor::Customer, 1.2)],
        BusinessCategory::Retail | BusinessCategory::Entertainment => &[],
    };
    for (factor, multiplier) in modifiers {
        if let Some(score) = scores.get_mut(factor) {
            *score *= multiplier;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CustomerSegment, IncomeLevel, RawContext};

    fn context(osm: &[(FeatureTag, u32)], categories: &[(&str, u32)]) -> MarketContext {
        let raw = RawContext {
            osm: osm.iter().copied().collect(),
            category_counts: categories
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        };
        // May is a neutral month for the general segment (multiplier 1.0).
        MarketContext::from_raw(raw, CustomerSegment::General, 5)
    }

    fn busy_context() -> MarketContext {
        context(
            &[
                (FeatureTag::School, 2),
                (FeatureTag::Hospital, 1),
                (FeatureTag::Police, 1),
                (FeatureTag::BusStop, 4),
                (FeatureTag::Subway, 1),
                (FeatureTag::Park, 1),
                (FeatureTag::Office, 5),
                (FeatureTag::Residential, 12),
            ],
            &[("cafe", 3), ("milk_tea", 2), ("grocery", 1)],
        )
    }

    #[test]
    fn test_all_components_bounded() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        for business in ["cafe", "milk_tea", "spa", "gaming", "unicorn_shop"] {
            let scores = score_components(&config, business, &inputs, &busy_context());
            assert_eq!(scores.len(), Factor::ALL.len());
            for (factor, score) in &scores {
                assert!(
                    (0.0..=1.0).contains(score),
                    "{} out of range for {}: {}",
                    factor,
                    business,
                    score
                );
            }
        }
    }

    #[test]
    fn test_safety_transport_landmark_formulas() {
        let ctx = context(
            &[
                (FeatureTag::Police, 1),
                (FeatureTag::BusStop, 3),
                (FeatureTag::School, 2),
                (FeatureTag::Office, 1),
            ],
            &[],
        );
        assert_eq!(safety_score(&ctx), 1.0 / 3.0);
        assert_eq!(transport_score(&ctx), 0.6);
        assert_eq!(landmark_score(&ctx), 0.3);
    }

    #[test]
    fn test_transport_subway_counts_double() {
        let ctx = context(&[(FeatureTag::Subway, 2)], &[]);
        assert_eq!(transport_score(&ctx), 0.8);
    }

    #[test]
    fn test_competition_decreases_with_saturation() {
        let config = EngineConfig::default();
        let empty = context(&[(FeatureTag::Residential, 12)], &[("cafe", 0)]);
        let crowded = context(&[(FeatureTag::Residential, 12)], &[("cafe", 12)]);
        let open = competition_score(&config, "cafe", &empty);
        let packed = competition_score(&config, "cafe", &crowded);
        assert!(open > packed);
        assert!(packed < 0.5);
    }

    #[test]
    fn test_competition_midpoint_sits_near_half() {
        let config = EngineConfig::default();
        // capacity = 10 * (600/1500 -> clamped 0.4) * 0.8 = 3.2; 1.6 competitors
        // would be exactly 50% saturation, so 2 sits just past the midpoint.
        let ctx = context(&[(FeatureTag::Residential, 12)], &[("cafe", 2)]);
        let score = competition_score(&config, "cafe", &ctx);
        assert!(score > 0.2 && score < 0.6, "got {}", score);
    }

    #[test]
    fn test_customer_score_uses_demographic_multiplier() {
        let config = EngineConfig::default();
        let inputs = UserInputs {
            customer_target: CustomerSegment::General,
            price_level: 2,
        };
        // Low-income area: milk tea gets a 1.1 bump on its 0.7 base.
        let ctx = context(&[(FeatureTag::Residential, 10)], &[]);
        assert_eq!(ctx.income_level, IncomeLevel::Low);
        let score = customer_score(&config, "milk_tea", &inputs, &ctx);
        assert!((score - 0.77).abs() < 1e-9);
    }

    #[test]
    fn test_seasonal_factor_scales_components() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let mut ctx = busy_context();
        let base = score_components(&config, "cafe", &inputs, &ctx);
        ctx.seasonal_factor = 0.5;
        let damped = score_components(&config, "cafe", &inputs, &ctx);
        for factor in Factor::ALL {
            assert!(damped[&factor] <= base[&factor] + 1e-12);
        }
    }

    #[test]
    fn test_category_modifier_pass() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let ctx = busy_context();
        // Food & beverage boosts transport; service dampens it.
        let fb = score_components(&config, "bakery", &inputs, &ctx);
        let service = score_components(&config, "laundry", &inputs, &ctx);
        assert!(fb[&Factor::Transport] > service[&Factor::Transport]);
    }

    #[test]
    fn test_scenario_adjustments_feed_components() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let mut ctx = busy_context();
        let base = score_components(&config, "cafe", &inputs, &ctx);
        ctx.scenario_adjustments.insert(Factor::Safety, -0.5);
        let shifted = score_components(&config, "cafe", &inputs, &ctx);
        assert!(shifted[&Factor::Safety] < base[&Factor::Safety]);
        assert_eq!(shifted[&Factor::Transport], base[&Factor::Transport]);
    }

    #[test]
    fn test_rent_penalty_lowers_financial_viability() {
        let config = EngineConfig::default();
        let inputs = UserInputs::default();
        let cheap = context(&[(FeatureTag::Residential, 10)], &[]);
        let prime = context(
            &[(FeatureTag::Office, 14), (FeatureTag::Subway, 2)],
            &[],
        );
        assert_eq!(cheap.rent_level, 1);
        assert_eq!(prime.rent_level, 4);
        let cheap_score = financial_viability_score(&config, "cafe", &inputs, &cheap);
        let prime_score = financial_viability_score(&config, "cafe", &inputs, &prime);
        // The rent term alone moves a full 0.3 of weight.
        assert!(cheap_score - prime_score > 0.05);
    }
}
