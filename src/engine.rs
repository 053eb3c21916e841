//! The engine facade: one object owning the configuration tables and rule
//! catalogs, built once per process and shared by reference. Every public
//! operation is a pure function of its inputs, so a single `Engine` is safe
//! to use from many threads at once.

use crate::context::{MarketContext, UserInputs};
use crate::rules::{RuleResult, RuleSummary, RulesEngine};
use crate::scenario::{self, ScenarioDefinition, ScenarioResult};
use crate::scoring::components::{score_components, ComponentScores};
use crate::scoring::config::EngineConfig;
use crate::scoring::engine::{quick_score, score_business, EngineError, ScoringResult};
use crate::scoring::weights::{resolve_weights, LocationType, MarketCondition, WeightMap};
use crate::sensitivity::{self, SensitivityReport};
use crate::simulate::{self, MonteCarloSummary};

pub struct Engine {
    config: EngineConfig,
    rules: RulesEngine,
    scenarios: Vec<ScenarioDefinition>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            rules: RulesEngine::new(),
            scenarios: scenario::built_in_scenarios(),
        }
    }

    /// Extend the scenario catalog with caller-supplied definitions.
    /// Validate them first (`validate_scenarios`); the engine trusts its
    /// catalog after construction.
    pub fn with_custom_scenarios(mut self, custom: Vec<ScenarioDefinition>) -> Self {
        self.scenarios.extend(custom);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn scenarios(&self) -> &[ScenarioDefinition] {
        &self.scenarios
    }

    /// Resolve the factor weights for a business under optional market and
    /// location modifiers.
    pub fn resolve_weights(
        &self,
        business_id: &str,
        market_condition: Option<MarketCondition>,
        location_type: Option<LocationType>,
    ) -> WeightMap {
        resolve_weights(&self.config, business_id, market_condition, location_type)
    }

    /// Score a business at a site with default weighting. Always returns a
    /// well-formed result; internal failures degrade to score 0 /
    /// confidence 0.
    pub fn score_business(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
    ) -> ScoringResult {
        let weights = self.resolve_weights(business_id, None, None);
        score_business(&self.config, business_id, inputs, ctx, &weights)
    }

    /// Score with explicit market-condition and location-type weighting.
    pub fn score_business_with(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
        market_condition: Option<MarketCondition>,
        location_type: Option<LocationType>,
    ) -> ScoringResult {
        let weights = self.resolve_weights(business_id, market_condition, location_type);
        score_business(&self.config, business_id, inputs, ctx, &weights)
    }

    /// Cheap five-signal screening score (0-100).
    pub fn quick_score(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
    ) -> f64 {
        quick_score(&self.config, business_id, inputs, ctx, None)
    }

    /// Component scores for a business, exposed for rule evaluation and
    /// report rendering.
    pub fn component_scores(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
    ) -> ComponentScores {
        score_components(&self.config, business_id, inputs, ctx)
    }

    /// Evaluate the rule catalogs against the context and scores.
    pub fn evaluate_rules(
        &self,
        business_id: &str,
        ctx: &MarketContext,
        scores: &ComponentScores,
    ) -> (Vec<RuleResult>, RuleSummary) {
        self.rules
            .evaluate_with_summary(&self.config, business_id, ctx, scores)
    }

    /// Weight-perturbation sensitivity at the configured default adjustment
    /// (or an explicit one).
    pub fn analyze_sensitivity(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
        adjustment: Option<f64>,
    ) -> SensitivityReport {
        let weights = self.resolve_weights(business_id, None, None);
        let scores = self.component_scores(business_id, inputs, ctx);
        sensitivity::analyze(
            &weights,
            &scores,
            adjustment.unwrap_or(self.config.sensitivity_adjustment),
        )
    }

    /// Replay the score under one scenario.
    pub fn run_scenario(
        &self,
        scenario: &ScenarioDefinition,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
        baseline_score: f64,
    ) -> Result<ScenarioResult, EngineError> {
        scenario::run_scenario(&self.config, scenario, business_id, inputs, ctx, baseline_score)
    }

    /// Run the whole catalog (built-in plus custom) against one baseline,
    /// sorted by impact magnitude.
    pub fn run_scenarios(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
    ) -> Vec<ScenarioResult> {
        let baseline = self.score_business(business_id, inputs, ctx).score;
        scenario::run_scenarios(
            &self.config,
            &self.scenarios,
            business_id,
            inputs,
            ctx,
            baseline,
        )
    }

    /// Monte Carlo uncertainty simulation over perturbed contexts.
    pub fn simulate_monte_carlo(
        &self,
        business_id: &str,
        inputs: &UserInputs,
        ctx: &MarketContext,
        runs: Option<usize>,
        seed: Option<u64>,
    ) -> Result<MonteCarloSummary, EngineError> {
        let weights = self.resolve_weights(business_id, None, None);
        simulate::simulate(
            &self.config,
            business_id,
            inputs,
            ctx,
            &weights,
            runs.unwrap_or(self.config.simulation.runs),
            seed,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CustomerSegment, FeatureTag, RawContext};
    use crate::rules::RiskLevel;
    use std::collections::BTreeMap;

    fn demo_context() -> MarketContext {
        let raw = RawContext {
            osm: [
                (FeatureTag::School, 2),
                (FeatureTag::Hospital, 1),
                (FeatureTag::Police, 1),
                (FeatureTag::BusStop, 3),
                (FeatureTag::Subway, 1),
                (FeatureTag::Park, 1),
                (FeatureTag::Office, 4),
                (FeatureTag::Residential, 10),
            ]
            .into_iter()
            .collect(),
            category_counts: [("cafe".to_string(), 3), ("milk_tea".to_string(), 2)]
                .into_iter()
                .collect(),
        };
        MarketContext::from_raw(raw, CustomerSegment::General, 5)
    }

    #[test]
    fn test_facade_score_is_well_formed() {
        let engine = Engine::default();
        let result = engine.score_business("cafe", &UserInputs::default(), &demo_context());
        assert!((0.0..=100.0).contains(&result.score));
        assert!((0.5..=1.0).contains(&result.confidence));
        assert!(!result.reasons.is_empty());
    }

    #[test]
    fn test_facade_operations_share_one_context() {
        let engine = Engine::default();
        let inputs = UserInputs::default();
        let ctx = demo_context();

        let scores = engine.component_scores("milk_tea", &inputs, &ctx);
        let (results, summary) = engine.evaluate_rules("milk_tea", &ctx, &scores);
        assert_eq!(summary.total_rules_triggered, results.len());

        let report = engine.analyze_sensitivity("milk_tea", &inputs, &ctx, None);
        assert_eq!(report.factors.len(), 8);

        let scenarios = engine.run_scenarios("milk_tea", &inputs, &ctx);
        assert_eq!(scenarios.len(), 8);

        // The shared context is still intact afterwards.
        assert_eq!(ctx.competitors("milk_tea"), 2);
    }

    #[test]
    fn test_custom_scenarios_join_the_catalog() {
        let mut modifications = BTreeMap::new();
        modifications.insert(crate::scoring::Factor::Safety, -0.3);
        let custom = ScenarioDefinition {
            id: "local_flood".to_string(),
            name: "Local flood".to_string(),
            description: String::new(),
            modifications,
            business_overrides: BTreeMap::new(),
        };
        let engine = Engine::default().with_custom_scenarios(vec![custom]);
        let results = engine.run_scenarios("cafe", &UserInputs::default(), &demo_context());
        assert_eq!(results.len(), 9);
        assert!(results.iter().any(|r| r.scenario_id == "local_flood"));
    }

    #[test]
    fn test_monte_carlo_through_facade() {
        let engine = Engine::default();
        let summary = engine
            .simulate_monte_carlo(
                "cafe",
                &UserInputs::default(),
                &demo_context(),
                Some(120),
                Some(5),
            )
            .unwrap();
        assert_eq!(summary.requested_trials, 120);
        assert!(summary.statistics.mean > 0.0);
    }

    #[test]
    fn test_saturated_market_reads_very_high_risk() {
        let engine = Engine::default();
        let raw = RawContext {
            osm: [(FeatureTag::School, 2), (FeatureTag::Police, 1)]
                .into_iter()
                .collect(),
            category_counts: [("milk_tea".to_string(), 9)].into_iter().collect(),
        };
        let ctx = MarketContext::from_raw(raw, CustomerSegment::Student, 5);
        let inputs = UserInputs {
            customer_target: CustomerSegment::Student,
            price_level: 2,
        };
        let scores = engine.component_scores("milk_tea", &inputs, &ctx);
        let (_, summary) = engine.evaluate_rules("milk_tea", &ctx, &scores);
        assert_eq!(summary.overall_risk, RiskLevel::VeryHigh);
    }
}
