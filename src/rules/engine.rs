use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde_json::json;

use crate::context::{FeatureTag, MarketContext};
use crate::rules::catalog;
use crate::rules::{Rule, RuleResult, RuleSummary};
use crate::scoring::components::ComponentScores;
use crate::scoring::config::EngineConfig;

/// Stateless rule evaluator over catalogs built once at construction.
#[derive(Debug, Clone)]
pub struct RulesEngine {
    general: Vec<Rule>,
    business: BTreeMap<&'static str, Vec<Rule>>,
    contextual: Vec<Rule>,
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RulesEngine {
    pub fn new() -> Self {
        Self {
            general: catalog::general_rules(),
            business: catalog::business_rules(),
            contextual: catalog::contextual_rules(),
        }
    }

    /// Evaluate every applicable rule for a business against the context
    /// and component scores.
    ///
    /// One failing rule never aborts the rest: a predicate error is logged
    /// and the rule treated as not triggered. Results come back ordered
    /// blocking-first, then by descending priority within a severity tier.
    pub fn evaluate(
        &self,
        config: &EngineConfig,
        business_id: &str,
        ctx: &MarketContext,
        scores: &ComponentScores,
    ) -> Vec<RuleResult> {
        let mut results = Vec::new();

        for rule in self.applicable_rules(business_id) {
            match rule.predicate.evaluate(config, business_id, ctx, scores) {
                Ok(true) => results.push(build_result(rule, business_id, ctx)),
                Ok(false) => {}
                Err(error) => {
                    tracing::warn!(
                        rule_id = rule.id,
                        %error,
                        "rule condition failed; treating as not triggered"
                    );
                }
            }
        }

        results.sort_by_key(|result| {
            (
                result.severity,
                Reverse(rule_priority(self, &result.rule_id)),
            )
        });
        results
    }

    /// Evaluation plus the aggregate summary in one call.
    pub fn evaluate_with_summary(
        &self,
        config: &EngineConfig,
        business_id: &str,
        ctx: &MarketContext,
        scores: &ComponentScores,
    ) -> (Vec<RuleResult>, RuleSummary) {
        let results = self.evaluate(config, business_id, ctx, scores);
        let summary = RuleSummary::from_results(&results);
        (results, summary)
    }

    fn applicable_rules<'a>(&'a self, business_id: &str) -> impl Iterator<Item = &'a Rule> {
        self.general
            .iter()
            .chain(
                self.business
                    .get(business_id)
                    .map(|rules| rules.as_slice())
                    .unwrap_or(&[])
                    .iter(),
            )
            .chain(self.contextual.iter())
    }
}

fn rule_priority(engine: &RulesEngine, rule_id: &str) -> u8 {
    engine
        .applicable_rules_all()
        .find(|rule| rule.id == rule_id)
        .map(|rule| rule.priority)
        .unwrap_or(1)
}

impl RulesEngine {
    fn applicable_rules_all(&self) -> impl Iterator<Item = &Rule> {
        self.general
            .iter()
            .chain(self.business.values().flatten())
            .chain(self.contextual.iter())
    }
}

fn build_result(rule: &Rule, business_id: &str, ctx: &MarketContext) -> RuleResult {
    RuleResult {
        rule_id: rule.id.to_string(),
        severity: rule.severity,
        category: rule.category,
        message: rule.message.to_string(),
        recommendation: rule.recommendation.to_string(),
        confidence: rule_confidence(rule, ctx),
        supporting_data: supporting_data(rule, business_id, ctx),
    }
}

/// Trust in a triggered rule: the category baseline scaled by how complete
/// the context data is, with a small floor bump, capped at 1.0.
fn rule_confidence(rule: &Rule, ctx: &MarketContext) -> f64 {
    (rule.category.base_confidence() * ctx.data_completeness() + 0.1).min(1.0)
}

fn supporting_data(
    rule: &Rule,
    business_id: &str,
    ctx: &MarketContext,
) -> BTreeMap<String, serde_json::Value> {
    let mut data = BTreeMap::new();
    data.insert(
        "rule_category".to_string(),
        json!(rule.category.as_str()),
    );

    if rule.id.contains("competition") || rule.id.contains("saturated") {
        data.insert(
            "competitor_count".to_string(),
            json!(ctx.competitors(business_id)),
        );
    }
    if rule.id.contains("safety") {
        data.insert(
            "safety_infrastructure".to_string(),
            json!({
                "police": ctx.feature(FeatureTag::Police),
                "hospital": ctx.feature(FeatureTag::Hospital),
            }),
        );
    }
    if rule.id.contains("transport") {
        data.insert(
            "transport_options".to_string(),
            json!({
                "bus_stops": ctx.feature(FeatureTag::BusStop),
                "subway": ctx.feature(FeatureTag::Subway),
            }),
        );
    }
    data
}
