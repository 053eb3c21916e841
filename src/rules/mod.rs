pub mod catalog;
pub mod engine;
pub mod predicates;

pub use engine::RulesEngine;
pub use predicates::{Predicate, PredicateError};

use std::collections::BTreeMap;

use serde::Serialize;

/// How bad a triggered rule is. Variant order is the sort order: blocking
/// issues always surface first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Blocking,
    Critical,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Blocking => "blocking",
            Severity::Critical => "critical",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Which concern a rule speaks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Market,
    Legal,
    Financial,
    Operational,
    Strategic,
}

impl RuleCategory {
    /// Baseline trust in a triggered rule of this category, before the
    /// data-completeness scaling.
    pub fn base_confidence(&self) -> f64 {
        match self {
            RuleCategory::Legal => 0.95,
            RuleCategory::Operational => 0.90,
            RuleCategory::Market => 0.80,
            RuleCategory::Financial => 0.70,
            RuleCategory::Strategic => 0.60,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Market => "market",
            RuleCategory::Legal => "legal",
            RuleCategory::Financial => "financial",
            RuleCategory::Operational => "operational",
            RuleCategory::Strategic => "strategic",
        }
    }
}

/// A declarative risk check. Static data plus a named predicate; no
/// executable code travels with the rule itself.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub category: RuleCategory,
    pub severity: Severity,
    pub predicate: Predicate,
    pub message: &'static str,
    pub recommendation: &'static str,
    /// 1-10, higher surfaces first within a severity tier.
    pub priority: u8,
}

/// A triggered rule, ready for display.
#[derive(Debug, Clone, Serialize)]
pub struct RuleResult {
    pub rule_id: String,
    pub severity: Severity,
    pub category: RuleCategory,
    pub message: String,
    pub recommendation: String,
    pub confidence: f64,
    pub supporting_data: BTreeMap<String, serde_json::Value>,
}

/// Five-step risk ladder shared by the rule summary and the Monte Carlo
/// volatility classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very_low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }
}

/// Aggregate view over one evaluation's triggered rules.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub total_rules_triggered: usize,
    pub blocking_issues: usize,
    pub critical_issues: usize,
    pub warnings: usize,
    pub info_items: usize,
    pub categories: BTreeMap<RuleCategory, usize>,
    pub overall_risk: RiskLevel,
}

impl RuleSummary {
    pub fn from_results(results: &[RuleResult]) -> Self {
        let count = |severity: Severity| results.iter().filter(|r| r.severity == severity).count();
        let blocking_issues = count(Severity::Blocking);
        let critical_issues = count(Severity::Critical);
        let warnings = count(Severity::Warning);
        let info_items = count(Severity::Info);

        let mut categories = BTreeMap::new();
        for result in results {
            *categories.entry(result.category).or_insert(0) += 1;
        }

        let overall_risk = if blocking_issues > 0 {
            RiskLevel::VeryHigh
        } else if critical_issues > 2 {
            RiskLevel::High
        } else if critical_issues > 0 || warnings > 3 {
            RiskLevel::Medium
        } else if warnings > 0 {
            RiskLevel::Low
        } else {
            RiskLevel::VeryLow
        };

        Self {
            total_rules_triggered: results.len(),
            blocking_issues,
            critical_issues,
            warnings,
            info_items,
            categories,
            overall_risk,
        }
    }
}
