use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::{ensure_config_dir, get_config_path};

const STARTER_CONFIG: &str = "\
# shop-scout configuration. Every key is optional.

defaults:
  # Segment the analysis targets when --customer is omitted:
  # student, office, family, tourist, elderly, young_professional, general
  customer_target: general
  # Intended price positioning, 1 (budget) to 4 (premium)
  price_level: 2
  # Pin the seasonal calendar to a month (1-12); omit to use the current month
  # month: 9

simulation:
  runs: 1000
  osm_jitter: 0.2
  category_jitter: 0.3
  success_threshold: 60

# Relative weight bump used by sensitivity analysis
sensitivity_adjustment: 0.2

# Extra what-if scenarios merged into the built-in catalog
custom_scenarios: []
#  - id: rent_spike
#    name: Rent spike
#    description: Landlords reprice the whole strip
#    modifications:
#      financial_viability: -0.4
#    business_overrides:
#      cafe:
#        financial_viability: -0.6
";

/// Write a commented starter config and return its path.
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_starter_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path {
        Some(p) => p,
        None => {
            ensure_config_dir()?;
            get_config_path()
        }
    };

    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    fs::write(&config_path, STARTER_CONFIG)
        .with_context(|| format!("Failed to write config file at {}", config_path.display()))?;
    Ok(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_starter_config_parses() {
        let config: AppConfig = serde_saphyr::from_str(STARTER_CONFIG).unwrap();
        assert_eq!(config.simulation.runs, 1000);
        assert!(config.custom_scenarios.is_empty());
    }
}
