use serde::{Deserialize, Serialize};

use crate::context::CustomerSegment;
use crate::scenario::ScenarioDefinition;
use crate::scoring::SimulationConfig;

/// Application configuration (`~/.config/shop-scout/config.yaml`).
/// Everything is optional; an absent file means all defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub defaults: Defaults,

    /// Monte Carlo knobs.
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Relative weight bump for sensitivity analysis (engine default 0.2).
    #[serde(default)]
    pub sensitivity_adjustment: Option<f64>,

    /// Extra scenarios merged into the built-in catalog.
    #[serde(default)]
    pub custom_scenarios: Vec<ScenarioDefinition>,
}

/// Default user inputs when the CLI flags are omitted.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    #[serde(default = "default_customer_target")]
    pub customer_target: CustomerSegment,
    #[serde(default = "default_price_level")]
    pub price_level: u8,
    /// Month (1-12) for the seasonal calendar; absent means "now".
    #[serde(default)]
    pub month: Option<u32>,
}

fn default_customer_target() -> CustomerSegment {
    CustomerSegment::General
}

fn default_price_level() -> u8 {
    2
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            customer_target: default_customer_target(),
            price_level: default_price_level(),
            month: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_parses_to_defaults() {
        let config: AppConfig = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config.defaults.customer_target, CustomerSegment::General);
        assert_eq!(config.defaults.price_level, 2);
        assert!(config.custom_scenarios.is_empty());
        assert_eq!(config.simulation.runs, 1000);
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
defaults:
  customer_target: student
  price_level: 1
  month: 9
simulation:
  runs: 400
sensitivity_adjustment: 0.25
custom_scenarios:
  - id: rent_spike
    name: Rent spike
    modifications:
      financial_viability: -0.4
"#;
        let config: AppConfig = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.defaults.customer_target, CustomerSegment::Student);
        assert_eq!(config.defaults.month, Some(9));
        assert_eq!(config.simulation.runs, 400);
        assert_eq!(config.sensitivity_adjustment, Some(0.25));
        assert_eq!(config.custom_scenarios.len(), 1);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        let yaml = "queries: []";
        assert!(serde_saphyr::from_str::<AppConfig>(yaml).is_err());
    }
}
