pub mod catalog;

pub use catalog::built_in_scenarios;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{FeatureTag, MarketContext, UserInputs};
use crate::scoring::config::EngineConfig;
use crate::scoring::engine::{try_score, EngineError};
use crate::scoring::weights::{resolve_weights, Factor};

/// A named macro future: general factor deltas plus per-business overrides
/// that win on overlapping factors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modifications: BTreeMap<Factor, f64>,
    #[serde(default)]
    pub business_overrides: BTreeMap<String, BTreeMap<Factor, f64>>,
}

/// Direction the site risk moves under a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskShift {
    ReducedSignificantly,
    ReducedSlightly,
    Unchanged,
    IncreasedSlightly,
    IncreasedSignificantly,
}

impl RiskShift {
    pub fn label(&self) -> &'static str {
        match self {
            RiskShift::ReducedSignificantly => "risk reduced significantly",
            RiskShift::ReducedSlightly => "risk reduced slightly",
            RiskShift::Unchanged => "risk unchanged",
            RiskShift::IncreasedSlightly => "risk increased slightly",
            RiskShift::IncreasedSignificantly => "risk increased significantly",
        }
    }
}

/// Outcome of replaying the score under one scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResult {
    pub scenario_id: String,
    pub scenario_name: String,
    pub baseline_score: f64,
    pub modified_score: f64,
    pub score_change: f64,
    pub score_change_percent: f64,
    /// Up to three phrases naming the largest deltas.
    pub key_impacts: Vec<String>,
    pub risk_shift: RiskShift,
    /// Up to five, mixing delta-triggered and scenario-specific advice.
    pub recommendations: Vec<String>,
}

/// Replay the score for one scenario against a cloned context.
pub fn run_scenario(
    config: &EngineConfig,
    scenario: &ScenarioDefinition,
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
    baseline_score: f64,
) -> Result<ScenarioResult, EngineError> {
    let modifications = merged_modifications(scenario, business_id);
    let modified_ctx = apply_modifications(ctx, &modifications);

    let weights = resolve_weights(config, business_id, None, None);
    let modified = try_score(config, business_id, inputs, &modified_ctx, &weights)?;

    let score_change = modified.score - baseline_score;
    let score_change_percent = if baseline_score == 0.0 {
        0.0
    } else {
        score_change / baseline_score * 100.0
    };

    Ok(ScenarioResult {
        scenario_id: scenario.id.clone(),
        scenario_name: scenario.name.clone(),
        baseline_score,
        modified_score: modified.score,
        score_change,
        score_change_percent,
        key_impacts: key_impacts(&modifications),
        risk_shift: classify_risk_shift(score_change_percent),
        recommendations: recommendations(scenario, score_change, &modifications),
    })
}

/// Run a batch of scenarios, sorted by impact magnitude. A scenario that
/// fails to score is logged and skipped; the rest still come back.
pub fn run_scenarios(
    config: &EngineConfig,
    scenarios: &[ScenarioDefinition],
    business_id: &str,
    inputs: &UserInputs,
    ctx: &MarketContext,
    baseline_score: f64,
) -> Vec<ScenarioResult> {
    let mut results: Vec<ScenarioResult> = scenarios
        .iter()
        .filter_map(|scenario| {
            match run_scenario(config, scenario, business_id, inputs, ctx, baseline_score) {
                Ok(result) => Some(result),
                Err(error) => {
                    tracing::warn!(scenario = %scenario.id, %error, "scenario failed; skipping");
                    None
                }
            }
        })
        .collect();

    results.sort_by(|a, b| {
        b.score_change
            .abs()
            .partial_cmp(&a.score_change.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results
}

/// General deltas overlaid with the business-specific overrides; overrides
/// win on overlapping factors.
fn merged_modifications(
    scenario: &ScenarioDefinition,
    business_id: &str,
) -> BTreeMap<Factor, f64> {
    let mut merged = scenario.modifications.clone();
    if let Some(overrides) = scenario.business_overrides.get(business_id) {
        for (factor, delta) in overrides {
            merged.insert(*factor, *delta);
        }
    }
    merged
}

/// Clone the context and apply the deltas. Competition scales the category
/// counts, transport scales the bus/subway counts (floored at zero,
/// truncated to whole venues); everything else is recorded for the
/// component scorer to consume as a multiplier.
fn apply_modifications(
    ctx: &MarketContext,
    modifications: &BTreeMap<Factor, f64>,
) -> MarketContext {
    let mut modified = ctx.clone();

    for (factor, delta) in modifications {
        match factor {
            Factor::Competition => {
                for count in modified.category_counts.values_mut() {
                    *count = scale_count(*count, *delta);
                }
            }
            Factor::Transport => {
                for tag in [FeatureTag::BusStop, FeatureTag::Subway] {
                    if let Some(count) = modified.osm_counts.get_mut(&tag) {
                        *count = scale_count(*count, *delta);
                    }
                }
            }
            _ => {
                modified.scenario_adjustments.insert(*factor, *delta);
            }
        }
    }
    modified
}

fn scale_count(count: u32, delta: f64) -> u32 {
    let scaled = (f64::from(count) * (1.0 + delta)).trunc();
    if scaled <= 0.0 {
        0
    } else {
        scaled as u32
    }
}

fn classify_risk_shift(score_change_percent: f64) -> RiskShift {
    if score_change_percent > 20.0 {
        RiskShift::ReducedSignificantly
    } else if score_change_percent > 10.0 {
        RiskShift::ReducedSlightly
    } else if score_change_percent >= -10.0 {
        RiskShift::Unchanged
    } else if score_change_percent >= -20.0 {
        RiskShift::IncreasedSlightly
    } else {
        RiskShift::IncreasedSignificantly
    }
}

/// Phrases for the up-to-three largest deltas.
fn key_impacts(modifications: &BTreeMap<Factor, f64>) -> Vec<String> {
    let mut sorted: Vec<(&Factor, &f64)> = modifications.iter().collect();
    sorted.sort_by(|a, b| {
        b.1.abs()
            .partial_cmp(&a.1.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    sorted
        .into_iter()
        .take(3)
        .map(|(factor, delta)| {
            let label = factor.label();
            if *delta > 0.2 {
                format!("sharp improvement in {}", label)
            } else if *delta > 0.0 {
                format!("slight improvement in {}", label)
            } else if *delta < -0.2 {
                format!("sharp drop in {}", label)
            } else {
                format!("slight drop in {}", label)
            }
        })
        .collect()
}

fn recommendations(
    scenario: &ScenarioDefinition,
    score_change: f64,
    modifications: &BTreeMap<Factor, f64>,
) -> Vec<String> {
    let mut recommendations = Vec::new();

    if score_change > 10.0 {
        recommendations.push(format!(
            "'{}' works in your favor; prepare to capitalize on it",
            scenario.name
        ));
    } else if score_change < -10.0 {
        recommendations.push(format!(
            "'{}' carries real downside; prepare a contingency plan",
            scenario.name
        ));
    }

    let delta = |factor: Factor| modifications.get(&factor).copied().unwrap_or(0.0);
    if delta(Factor::Competition) > 0.3 {
        recommendations
            .push("Prepare a differentiation strategy for a much busier market".to_string());
    }
    if delta(Factor::MarketPotential) < -0.3 {
        recommendations
            .push("Diversify the product or service mix to spread demand risk".to_string());
    }
    if delta(Factor::FinancialViability) < -0.3 {
        recommendations
            .push("Trim operating costs and hold a financial reserve".to_string());
    }
    if delta(Factor::Transport) > 0.3 {
        recommendations
            .push("Use the improved transport links to widen the catchment area".to_string());
    }

    match scenario.id.as_str() {
        "economic_downturn" => {
            recommendations.push("Focus on essential, repeat-purchase offerings".to_string());
            recommendations.push("Build a loyal regular-customer base early".to_string());
        }
        "strong_growth" => {
            recommendations.push("Plan capacity for expansion ahead of demand".to_string());
            recommendations.push("Invest in marketing while attention is cheap".to_string());
        }
        "pandemic_shock" => {
            recommendations.push("Stand up online ordering and delivery channels".to_string());
            recommendations.push("Keep the operating model flexible".to_string());
        }
        _ => {}
    }

    recommendations.truncate(5);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CustomerSegment, RawContext};
    use crate::scoring::engine::score_business;

    fn context(osm: &[(FeatureTag, u32)], categories: &[(&str, u32)]) -> MarketContext {
        let raw = RawContext {
            osm: osm.iter().copied().collect(),
            category_counts: categories
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        };
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
            &[("cafe", 3), ("milk_tea", 2)],
        )
    }

    fn baseline(config: &EngineConfig, business_id: &str, ctx: &MarketContext) -> f64 {
        let weights = resolve_weights(config, business_id, None, None);
        score_business(config, business_id, &UserInputs::default(), ctx, &weights).score
    }

    #[test]
    fn test_zero_modification_scenario_changes_nothing() {
        let config = EngineConfig::default();
        let ctx = busy_context();
        let base = baseline(&config, "cafe", &ctx);
        let noop = ScenarioDefinition {
            id: "noop".to_string(),
            name: "No-op".to_string(),
            description: String::new(),
            modifications: BTreeMap::new(),
            business_overrides: BTreeMap::new(),
        };

        let result =
            run_scenario(&config, &noop, "cafe", &UserInputs::default(), &ctx, base).unwrap();
        assert_eq!(result.score_change, 0.0);
        assert_eq!(result.risk_shift, RiskShift::Unchanged);
    }

    #[test]
    fn test_competition_delta_scales_category_counts() {
        let ctx = context(&[], &[("cafe", 10), ("milk_tea", 3)]);
        let mut mods = BTreeMap::new();
        mods.insert(Factor::Competition, 0.5);
        let modified = apply_modifications(&ctx, &mods);
        assert_eq!(modified.competitors("cafe"), 15);
        // 3 * 1.5 = 4.5, truncated to 4.
        assert_eq!(modified.competitors("milk_tea"), 4);
        // Original context untouched.
        assert_eq!(ctx.competitors("cafe"), 10);
        // Count-materialized deltas are not recorded as adjustments.
        assert!(modified.scenario_adjustments.is_empty());
    }

    #[test]
    fn test_negative_competition_delta_floors_at_zero() {
        let ctx = context(&[], &[("cafe", 2)]);
        let mut mods = BTreeMap::new();
        mods.insert(Factor::Competition, -1.5);
        let modified = apply_modifications(&ctx, &mods);
        assert_eq!(modified.competitors("cafe"), 0);
    }

    #[test]
    fn test_transport_delta_scales_bus_and_subway() {
        let ctx = context(&[(FeatureTag::BusStop, 4), (FeatureTag::Subway, 2)], &[]);
        let mut mods = BTreeMap::new();
        mods.insert(Factor::Transport, 0.5);
        let modified = apply_modifications(&ctx, &mods);
        assert_eq!(modified.feature(FeatureTag::BusStop), 6);
        assert_eq!(modified.feature(FeatureTag::Subway), 3);
    }

    #[test]
    fn test_recorded_deltas_shift_their_component() {
        // Safety has no count materialization; the delta must still move
        // the score through the recorded-adjustment path.
        let config = EngineConfig::default();
        let ctx = busy_context();
        let base = baseline(&config, "cafe", &ctx);

        let mut modifications = BTreeMap::new();
        modifications.insert(Factor::Safety, -0.7);
        let crisis = ScenarioDefinition {
            id: "safety_drop".to_string(),
            name: "Safety drop".to_string(),
            description: String::new(),
            modifications,
            business_overrides: BTreeMap::new(),
        };

        let result =
            run_scenario(&config, &crisis, "cafe", &UserInputs::default(), &ctx, base).unwrap();
        assert!(result.score_change < 0.0);
    }

    #[test]
    fn test_business_override_takes_precedence() {
        let scenarios = built_in_scenarios();
        let shift = scenarios.iter().find(|s| s.id == "demographic_shift").unwrap();
        let merged = merged_modifications(shift, "spa");
        // The general +0.3 customer delta is replaced by spa's -0.2.
        assert_eq!(merged[&Factor::Customer], -0.2);
        // Factors without an override keep the general delta.
        assert_eq!(merged[&Factor::MarketPotential], 0.2);

        let merged_other = merged_modifications(shift, "cafe");
        assert_eq!(merged_other[&Factor::Customer], 0.3);
    }

    #[test]
    fn test_risk_shift_thresholds() {
        assert_eq!(classify_risk_shift(25.0), RiskShift::ReducedSignificantly);
        assert_eq!(classify_risk_shift(15.0), RiskShift::ReducedSlightly);
        assert_eq!(classify_risk_shift(0.0), RiskShift::Unchanged);
        assert_eq!(classify_risk_shift(-10.0), RiskShift::Unchanged);
        assert_eq!(classify_risk_shift(-15.0), RiskShift::IncreasedSlightly);
        assert_eq!(classify_risk_shift(-30.0), RiskShift::IncreasedSignificantly);
    }

    #[test]
    fn test_key_impacts_take_three_largest() {
        let mut mods = BTreeMap::new();
        mods.insert(Factor::Safety, -0.7);
        mods.insert(Factor::Customer, -0.3);
        mods.insert(Factor::MarketPotential, -0.4);
        mods.insert(Factor::Landmark, 0.1);
        let impacts = key_impacts(&mods);
        assert_eq!(impacts.len(), 3);
        assert!(impacts[0].contains("area safety"));
        assert!(impacts[0].contains("sharp drop"));
    }

    #[test]
    fn test_run_scenarios_sorted_by_impact() {
        let config = EngineConfig::default();
        let ctx = busy_context();
        let base = baseline(&config, "milk_tea", &ctx);
        let results = run_scenarios(
            &config,
            &built_in_scenarios(),
            "milk_tea",
            &UserInputs::default(),
            &ctx,
            base,
        );
        assert_eq!(results.len(), 8);
        for window in results.windows(2) {
            assert!(window[0].score_change.abs() >= window[1].score_change.abs());
        }
    }

    #[test]
    fn test_custom_scenario_yaml_shape() {
        let yaml = r#"
id: rent_spike
name: Rent spike
description: Landlords reprice the whole strip
modifications:
  financial_viability: -0.4
business_overrides:
  cafe:
    financial_viability: -0.6
"#;
        let scenario: ScenarioDefinition = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(scenario.id, "rent_spike");
        assert_eq!(scenario.modifications[&Factor::FinancialViability], -0.4);
        assert_eq!(
            scenario.business_overrides["cafe"][&Factor::FinancialViability],
            -0.6
        );
    }
}
