use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::context::{CustomerSegment, IncomeLevel};
use crate::scoring::weights::{Factor, WeightMap};

/// Broad business category, used for competition intensity and the
/// category-level score modifier pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessCategory {
    FoodBeverage,
    Retail,
    Service,
    Entertainment,
}

impl BusinessCategory {
    /// How hot the competitive environment runs for this category.
    /// Values below 1.0 depress the competition score (the market fights
    /// harder for the same customers), values above 1.0 relax it.
    pub fn competition_intensity(&self) -> f64 {
        match self {
            BusinessCategory::FoodBeverage => 0.90,
            BusinessCategory::Entertainment => 0.92,
            BusinessCategory::Retail => 1.0,
            BusinessCategory::Service => 1.08,
        }
    }
}

/// Category for a business id. Unlisted ids are treated as services,
/// the broadest bucket.
pub fn business_category(business_id: &str) -> BusinessCategory {
    match business_id {
        "cafe" | "milk_tea" | "fast_food" | "bakery" | "ice_cream" | "drink_shop" => {
            BusinessCategory::FoodBeverage
        }
        "grocery" | "clothing" | "electronics" | "bookstore" | "stationery" | "pet_shop"
        | "toy_store" | "flower_shop" | "bike_shop" => BusinessCategory::Retail,
        "gaming" | "tattoo" => BusinessCategory::Entertainment,
        _ => BusinessCategory::Service,
    }
}

/// Tunable Monte Carlo knobs. These are the only engine constants exposed
/// through the application config file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of trials per run.
    #[serde(default = "default_runs")]
    pub runs: usize,
    /// Relative perturbation applied to every feature count.
    #[serde(default = "default_osm_jitter")]
    pub osm_jitter: f64,
    /// Relative perturbation applied to every category count.
    #[serde(default = "default_category_jitter")]
    pub category_jitter: f64,
    /// Score at or above which a trial counts as a success.
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,
}

fn default_runs() -> usize {
    1000
}
fn default_osm_jitter() -> f64 {
    0.2
}
fn default_category_jitter() -> f64 {
    0.3
}
fn default_success_threshold() -> f64 {
    60.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            osm_jitter: default_osm_jitter(),
            category_jitter: default_category_jitter(),
            success_threshold: default_success_threshold(),
        }
    }
}

/// All static tables the engine scores against.
///
/// Built once (normally via `Default`) and passed by reference into every
/// operation; nothing in here changes after construction, so an
/// `EngineConfig` can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Fallback factor weights for business ids without their own table.
    pub default_weights: WeightMap,
    /// Per-business factor weights.
    pub business_weights: BTreeMap<String, WeightMap>,
    /// Five-factor table for the quick screening score.
    pub quick_weights: WeightMap,
    /// business x customer-segment affinity, 0.0-1.0.
    pub affinity: BTreeMap<CustomerSegment, BTreeMap<String, f64>>,
    /// Affinity fallback when no specific segment is targeted.
    pub general_affinity: BTreeMap<String, f64>,
    /// Customer-score multiplier keyed on (business, area income level).
    pub demographic_multipliers: BTreeMap<(String, IncomeLevel), f64>,
    /// Venues of this type a baseline area can support.
    pub capacity_ratios: BTreeMap<String, f64>,
    pub default_capacity_ratio: f64,
    /// Typical gross-margin constant per business type.
    pub profit_margins: BTreeMap<String, f64>,
    pub default_profit_margin: f64,
    /// Competitor count at which a market counts as saturated.
    pub saturation_thresholds: BTreeMap<String, u32>,
    pub default_saturation_threshold: u32,
    /// Relative weight bump used by the sensitivity analyzer.
    pub sensitivity_adjustment: f64,
    pub simulation: SimulationConfig,
}

fn weight_map(entries: &[(Factor, f64)]) -> WeightMap {
    entries.iter().copied().collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        use Factor::*;

        let default_weights = weight_map(&[
            (Customer, 0.20),
            (Competition, 0.18),
            (MarketPotential, 0.15),
            (FinancialViability, 0.15),
            (Safety, 0.08),
            (Transport, 0.12),
            (Landmark, 0.07),
            (OperationalFeasibility, 0.05),
        ]);

        let mut business_weights = BTreeMap::new();
        business_weights.insert(
            "cafe".to_string(),
            weight_map(&[
                (Customer, 0.25),
                (Competition, 0.20),
                (MarketPotential, 0.12),
                (FinancialViability, 0.13),
                (Safety, 0.05),
                (Transport, 0.15),
                (Landmark, 0.08),
                (OperationalFeasibility, 0.02),
            ]),
        );
        business_weights.insert(
            "milk_tea".to_string(),
            weight_map(&[
                (Customer, 0.30),
                (Competition, 0.22),
                (MarketPotential, 0.10),
                (FinancialViability, 0.12),
                (Safety, 0.03),
                (Transport, 0.18),
                (Landmark, 0.04),
                (OperationalFeasibility, 0.01),
            ]),
        );
        business_weights.insert(
            "fast_food".to_string(),
            weight_map(&[
                (Customer, 0.15),
                (Competition, 0.25),
                (MarketPotential, 0.15),
                (FinancialViability, 0.18),
                (Safety, 0.05),
                (Transport, 0.17),
                (Landmark, 0.03),
                (OperationalFeasibility, 0.02),
            ]),
        );
        business_weights.insert(
            "spa".to_string(),
            weight_map(&[
                (Customer, 0.28),
                (Competition, 0.15),
                (MarketPotential, 0.18),
                (FinancialViability, 0.20),
                (Safety, 0.10),
                (Transport, 0.05),
                (Landmark, 0.02),
                (OperationalFeasibility, 0.02),
            ]),
        );
        business_weights.insert(
            "pharmacy".to_string(),
            weight_map(&[
                (Customer, 0.12),
                (Competition, 0.20),
                (MarketPotential, 0.15),
                (FinancialViability, 0.15),
                (Safety, 0.12),
                (Transport, 0.18),
                (Landmark, 0.06),
                (OperationalFeasibility, 0.02),
            ]),
        );
        business_weights.insert(
            "hair_salon".to_string(),
            weight_map(&[
                (Customer, 0.22),
                (Competition, 0.18),
                (MarketPotential, 0.13),
                (FinancialViability, 0.16),
                (Safety, 0.08),
                (Transport, 0.10),
                (Landmark, 0.05),
                (OperationalFeasibility, 0.08),
            ]),
        );
        business_weights.insert(
            "grocery".to_string(),
            weight_map(&[
                (Customer, 0.10),
                (Competition, 0.16),
                (MarketPotential, 0.12),
                (FinancialViability, 0.18),
                (Safety, 0.08),
                (Transport, 0.25),
                (Landmark, 0.08),
                (OperationalFeasibility, 0.03),
            ]),
        );
        business_weights.insert(
            "clothing".to_string(),
            weight_map(&[
                (Customer, 0.30),
                (Competition, 0.20),
                (MarketPotential, 0.18),
                (FinancialViability, 0.15),
                (Safety, 0.05),
                (Transport, 0.08),
                (Landmark, 0.02),
                (OperationalFeasibility, 0.02),
            ]),
        );
        business_weights.insert(
            "electronics".to_string(),
            weight_map(&[
                (Customer, 0.18),
                (Competition, 0.22),
                (MarketPotential, 0.20),
                (FinancialViability, 0.20),
                (Safety, 0.08),
                (Transport, 0.08),
                (Landmark, 0.02),
                (OperationalFeasibility, 0.02),
            ]),
        );
        business_weights.insert(
            "gaming".to_string(),
            weight_map(&[
                (Customer, 0.35),
                (Competition, 0.18),
                (MarketPotential, 0.15),
                (FinancialViability, 0.12),
                (Safety, 0.05),
                (Transport, 0.10),
                (Landmark, 0.03),
                (OperationalFeasibility, 0.02),
            ]),
        );

        let quick_weights = weight_map(&[
            (Customer, 0.30),
            (Competition, 0.25),
            (Safety, 0.15),
            (Transport, 0.15),
            (Landmark, 0.15),
        ]);

        let mut affinity = BTreeMap::new();
        affinity.insert(
            CustomerSegment::Student,
            str_map(&[
                ("milk_tea", 1.0),
                ("fast_food", 0.9),
                ("cafe", 0.8),
                ("printing", 0.8),
                ("gaming", 0.7),
                ("bookstore", 0.6),
            ]),
        );
        affinity.insert(
            CustomerSegment::Office,
            str_map(&[
                ("cafe", 1.0),
                ("pharmacy", 0.8),
                ("laundry", 0.7),
                ("bakery", 0.6),
                ("spa", 0.6),
            ]),
        );
        affinity.insert(
            CustomerSegment::Family,
            str_map(&[
                ("grocery", 1.0),
                ("pharmacy", 0.9),
                ("clothing", 0.8),
                ("pet_shop", 0.6),
                ("flower_shop", 0.6),
            ]),
        );
        affinity.insert(
            CustomerSegment::Tourist,
            str_map(&[
                ("ice_cream", 1.0),
                ("gift_shop", 0.9),
                ("spa", 0.8),
                ("drink_shop", 0.8),
                ("tattoo", 0.7),
            ]),
        );

        let general_affinity = str_map(&[
            ("cafe", 0.7),
            ("milk_tea", 0.7),
            ("fast_food", 0.7),
            ("grocery", 0.8),
            ("pharmacy", 0.75),
            ("drink_shop", 0.7),
            ("bakery", 0.7),
            ("clothing", 0.65),
            ("electronics", 0.6),
            ("spa", 0.55),
            ("hair_salon", 0.65),
            ("nail", 0.6),
            ("flower_shop", 0.6),
            ("stationery", 0.55),
            ("pet_shop", 0.55),
            ("barbershop", 0.5),
            ("bookstore", 0.5),
            ("laundry", 0.5),
            ("repair", 0.5),
            ("toy_store", 0.5),
            ("ice_cream", 0.5),
            ("printing", 0.5),
            ("tattoo", 0.4),
            ("gaming", 0.4),
            ("bike_shop", 0.4),
        ]);

        let mut demographic_multipliers = BTreeMap::new();
        for (business, level, multiplier) in [
            ("spa", IncomeLevel::High, 1.3),
            ("spa", IncomeLevel::Low, 0.6),
            ("clothing", IncomeLevel::High, 1.2),
            ("electronics", IncomeLevel::High, 1.15),
            ("electronics", IncomeLevel::Low, 0.8),
            ("milk_tea", IncomeLevel::Low, 1.1),
            ("grocery", IncomeLevel::Low, 1.1),
            ("fast_food", IncomeLevel::Low, 1.05),
            ("hair_salon", IncomeLevel::High, 1.1),
            ("gaming", IncomeLevel::High, 0.9),
        ] {
            demographic_multipliers.insert((business.to_string(), level), multiplier);
        }

        let capacity_ratios = str_map(&[
            ("cafe", 10.0),
            ("milk_tea", 8.0),
            ("fast_food", 12.0),
            ("grocery", 9.0),
            ("clothing", 8.0),
            ("hair_salon", 7.0),
            ("electronics", 6.0),
            ("spa", 5.0),
            ("pharmacy", 4.0),
            ("gaming", 3.0),
        ]);

        let profit_margins = str_map(&[
            ("milk_tea", 0.65),
            ("spa", 0.60),
            ("hair_salon", 0.60),
            ("cafe", 0.55),
            ("gaming", 0.55),
            ("fast_food", 0.50),
            ("clothing", 0.50),
            ("pharmacy", 0.45),
            ("electronics", 0.35),
            ("grocery", 0.30),
        ]);

        let saturation_thresholds: BTreeMap<String, u32> = [
            ("milk_tea", 6u32),
            ("cafe", 8),
            ("pharmacy", 3),
            ("spa", 4),
            ("gaming", 2),
            ("fast_food", 10),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

        Self {
            default_weights,
            business_weights,
            quick_weights,
            affinity,
            general_affinity,
            demographic_multipliers,
            capacity_ratios,
            default_capacity_ratio: 6.0,
            profit_margins,
            default_profit_margin: 0.5,
            saturation_thresholds,
            default_saturation_threshold: 5,
            sensitivity_adjustment: 0.2,
            simulation: SimulationConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Affinity between a business and a customer segment.
    /// Matrix misses fall back to 0.4; general-table misses to 0.5.
    pub fn customer_affinity(&self, business_id: &str, segment: CustomerSegment) -> f64 {
        if let Some(matrix) = self.affinity.get(&segment) {
            return matrix.get(business_id).copied().unwrap_or(0.4);
        }
        self.general_affinity
            .get(business_id)
            .copied()
            .unwrap_or(0.5)
    }

    pub fn demographic_multiplier(&self, business_id: &str, level: IncomeLevel) -> f64 {
        self.demographic_multipliers
            .get(&(business_id.to_string(), level))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn capacity_ratio(&self, business_id: &str) -> f64 {
        self.capacity_ratios
            .get(business_id)
            .copied()
            .unwrap_or(self.default_capacity_ratio)
    }

    pub fn profit_margin(&self, business_id: &str) -> f64 {
        self.profit_margins
            .get(business_id)
            .copied()
            .unwrap_or(self.default_profit_margin)
    }

    pub fn saturation_threshold(&self, business_id: &str) -> u32 {
        self.saturation_thresholds
            .get(business_id)
            .copied()
            .unwrap_or(self.default_saturation_threshold)
    }
}

fn str_map(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), *v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affinity_matrix_lookup() {
        let config = EngineConfig::default();
        assert_eq!(
            config.customer_affinity("milk_tea", CustomerSegment::Student),
            1.0
        );
        // Matrix miss -> 0.4
        assert_eq!(
            config.customer_affinity("pharmacy", CustomerSegment::Student),
            0.4
        );
        // No matrix for the segment -> general defaults
        assert_eq!(
            config.customer_affinity("grocery", CustomerSegment::General),
            0.8
        );
        // Unknown business on the general path -> 0.5
        assert_eq!(
            config.customer_affinity("unicorn_shop", CustomerSegment::General),
            0.5
        );
    }

    #[test]
    fn test_unlisted_lookups_use_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.capacity_ratio("unicorn_shop"), 6.0);
        assert_eq!(config.profit_margin("unicorn_shop"), 0.5);
        assert_eq!(config.saturation_threshold("unicorn_shop"), 5);
        assert_eq!(
            config.demographic_multiplier("unicorn_shop", IncomeLevel::High),
            1.0
        );
    }

    #[test]
    fn test_business_category_mapping() {
        assert_eq!(business_category("milk_tea"), BusinessCategory::FoodBeverage);
        assert_eq!(business_category("grocery"), BusinessCategory::Retail);
        assert_eq!(business_category("gaming"), BusinessCategory::Entertainment);
        assert_eq!(business_category("laundry"), BusinessCategory::Service);
        assert_eq!(business_category("unicorn_shop"), BusinessCategory::Service);
    }

    #[test]
    fn test_simulation_config_partial_parse() {
        let yaml = "runs: 250";
        let parsed: SimulationConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(parsed.runs, 250);
        assert_eq!(parsed.osm_jitter, 0.2);
        assert_eq!(parsed.success_threshold, 60.0);
    }
}
