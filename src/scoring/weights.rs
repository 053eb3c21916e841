use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::config::EngineConfig;

/// The eight factors every score decomposes into. The set is fixed; weight
/// maps and component-score maps are both keyed by it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Customer,
    Competition,
    MarketPotential,
    FinancialViability,
    Safety,
    Transport,
    Landmark,
    OperationalFeasibility,
}

impl Factor {
    pub const ALL: [Factor; 8] = [
        Factor::Customer,
        Factor::Competition,
        Factor::MarketPotential,
        Factor::FinancialViability,
        Factor::Safety,
        Factor::Transport,
        Factor::Landmark,
        Factor::OperationalFeasibility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Customer => "customer",
            Factor::Competition => "competition",
            Factor::MarketPotential => "market_potential",
            Factor::FinancialViability => "financial_viability",
            Factor::Safety => "safety",
            Factor::Transport => "transport",
            Factor::Landmark => "landmark",
            Factor::OperationalFeasibility => "operational_feasibility",
        }
    }

    /// Short human phrase for report text.
    pub fn label(&self) -> &'static str {
        match self {
            Factor::Customer => "customer fit",
            Factor::Competition => "competitive pressure",
            Factor::MarketPotential => "market potential",
            Factor::FinancialViability => "financial viability",
            Factor::Safety => "area safety",
            Factor::Transport => "transport access",
            Factor::Landmark => "landmark proximity",
            Factor::OperationalFeasibility => "operating conditions",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factor weights. Resolved maps sum to 1.0 (within 1e-6) with every entry
/// non-negative.
pub type WeightMap = BTreeMap<Factor, f64>;

/// Overall state of the local market, shifting which factors matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCondition {
    HighGrowth,
    MatureMarket,
    DecliningMarket,
}

impl MarketCondition {
    fn modifiers(&self) -> &'static [(Factor, f64)] {
        match self {
            MarketCondition::HighGrowth => &[
                (Factor::MarketPotential, 1.3),
                (Factor::Competition, 0.9),
                (Factor::FinancialViability, 1.2),
            ],
            MarketCondition::MatureMarket => &[
                (Factor::Competition, 1.2),
                (Factor::Customer, 1.1),
                (Factor::OperationalFeasibility, 1.1),
            ],
            MarketCondition::DecliningMarket => &[
                (Factor::MarketPotential, 0.7),
                (Factor::Competition, 1.4),
                (Factor::FinancialViability, 0.8),
            ],
        }
    }
}

impl FromStr for MarketCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high_growth" | "high-growth" => Ok(MarketCondition::HighGrowth),
            "mature_market" | "mature" => Ok(MarketCondition::MatureMarket),
            "declining_market" | "declining" => Ok(MarketCondition::DecliningMarket),
            other => Err(format!(
                "unknown market condition '{}' (expected high_growth, mature_market, or declining_market)",
                other
            )),
        }
    }
}

/// Kind of neighborhood the site sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    CityCenter,
    Residential,
    Commercial,
    Suburban,
}

impl LocationType {
    fn modifiers(&self) -> &'static [(Factor, f64)] {
        match self {
            LocationType::CityCenter => &[
                (Factor::Transport, 1.3),
                (Factor::Competition, 1.2),
                // Rent pressure makes margins matter less than fit.
                (Factor::FinancialViability, 0.8),
            ],
            LocationType::Residential => &[
                (Factor::Customer, 1.2),
                (Factor::Safety, 1.2),
                (Factor::Competition, 0.9),
            ],
            LocationType::Commercial => &[
                (Factor::Landmark, 1.3),
                (Factor::Transport, 1.1),
                (Factor::Competition, 1.1),
            ],
            LocationType::Suburban => &[
                (Factor::Safety, 1.2),
                (Factor::FinancialViability, 1.1),
                (Factor::Transport, 0.8),
            ],
        }
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "city_center" | "city-center" | "downtown" => Ok(LocationType::CityCenter),
            "residential" => Ok(LocationType::Residential),
            "commercial" => Ok(LocationType::Commercial),
            "suburban" => Ok(LocationType::Suburban),
            other => Err(format!(
                "unknown location type '{}' (expected city_center, residential, commercial, or suburban)",
                other
            )),
        }
    }
}

/// Resolve the factor weights for a business.
///
/// Unknown business ids are a normal case (free-text categories) and fall
/// back to the default table. Market-condition and location-type multipliers
/// apply independently, then the map is renormalized to sum 1.0. A
/// degenerate all-zero table falls back to the defaults instead of dividing
/// by zero.
pub fn resolve_weights(
    config: &EngineConfig,
    business_id: &str,
    market_condition: Option<MarketCondition>,
    location_type: Option<LocationType>,
) -> WeightMap {
    let mut weights = config
        .business_weights
        .get(business_id)
        .unwrap_or(&config.default_weights)
        .clone();

    if let Some(condition) = market_condition {
        apply_modifiers(&mut weights, condition.modifiers());
    }
    if let Some(location) = location_type {
        apply_modifiers(&mut weights, location.modifiers());
    }

    let total: f64 = weights.values().sum();
    if total <= 0.0 {
        return config.default_weights.clone();
    }
    for value in weights.values_mut() {
        *value /= total;
    }
    weights
}

fn apply_modifiers(weights: &mut WeightMap, modifiers: &[(Factor, f64)]) {
    for (factor, multiplier) in modifiers {
        if let Some(value) = weights.get_mut(factor) {
            *value *= multiplier;
        }
    }
}

/// Static criticality band derived from a resolved weight alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightBand {
    Critical,
    High,
    Medium,
    Low,
    Minimal,
}

impl WeightBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightBand::Critical => "critical",
            WeightBand::High => "high",
            WeightBand::Medium => "medium",
            WeightBand::Low => "low",
            WeightBand::Minimal => "minimal",
        }
    }
}

/// Which factors dominate this business's outcome, from the weights alone.
pub fn weight_bands(weights: &WeightMap) -> BTreeMap<Factor, WeightBand> {
    weights
        .iter()
        .map(|(factor, weight)| {
            let band = if *weight >= 0.20 {
                WeightBand::Critical
            } else if *weight >= 0.15 {
                WeightBand::High
            } else if *weight >= 0.10 {
                WeightBand::Medium
            } else if *weight >= 0.05 {
                WeightBand::Low
            } else {
                WeightBand::Minimal
            };
            (*factor, band)
        })
        .collect()
}
