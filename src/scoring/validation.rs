use crate::scenario::ScenarioDefinition;
use crate::scoring::config::EngineConfig;
use crate::scoring::weights::WeightMap;

/// Validate the engine configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_weight_table(&config.default_weights, "default_weights", &mut errors);
    check_weight_table(&config.quick_weights, "quick_weights", &mut errors);
    for (business, table) in &config.business_weights {
        check_weight_table(table, &format!("business_weights.{}", business), &mut errors);
    }

    for (segment, matrix) in &config.affinity {
        for (business, value) in matrix {
            if !(0.0..=1.0).contains(value) {
                errors.push(format!(
                    "affinity.{}.{}: must be within 0.0-1.0 (got {})",
                    segment, business, value
                ));
            }
        }
    }
    for (business, value) in &config.general_affinity {
        if !(0.0..=1.0).contains(value) {
            errors.push(format!(
                "general_affinity.{}: must be within 0.0-1.0 (got {})",
                business, value
            ));
        }
    }

    for ((business, level), multiplier) in &config.demographic_multipliers {
        if *multiplier <= 0.0 || !multiplier.is_finite() {
            errors.push(format!(
                "demographic_multipliers.{}.{}: must be a positive number (got {})",
                business,
                level.as_str(),
                multiplier
            ));
        }
    }

    for (business, ratio) in &config.capacity_ratios {
        if *ratio < 0.0 || !ratio.is_finite() {
            errors.push(format!(
                "capacity_ratios.{}: must be non-negative (got {})",
                business, ratio
            ));
        }
    }
    if config.default_capacity_ratio <= 0.0 {
        errors.push("default_capacity_ratio: must be positive".to_string());
    }

    for (business, margin) in &config.profit_margins {
        if !(0.0..=1.0).contains(margin) {
            errors.push(format!(
                "profit_margins.{}: must be within 0.0-1.0 (got {})",
                business, margin
            ));
        }
    }

    for (business, threshold) in &config.saturation_thresholds {
        if *threshold == 0 {
            errors.push(format!(
                "saturation_thresholds.{}: must be at least 1",
                business
            ));
        }
    }

    if config.sensitivity_adjustment <= 0.0 || !config.sensitivity_adjustment.is_finite() {
        errors.push("sensitivity_adjustment: must be a positive number".to_string());
    }

    if config.simulation.runs == 0 {
        errors.push("simulation.runs: must be at least 1".to_string());
    }
    for (name, jitter) in [
        ("simulation.osm_jitter", config.simulation.osm_jitter),
        ("simulation.category_jitter", config.simulation.category_jitter),
    ] {
        if !(jitter > 0.0 && jitter <= 1.0) {
            errors.push(format!("{}: must be within (0.0, 1.0] (got {})", name, jitter));
        }
    }
    if !(0.0..=100.0).contains(&config.simulation.success_threshold) {
        errors.push(format!(
            "simulation.success_threshold: must be within 0-100 (got {})",
            config.simulation.success_threshold
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate caller-supplied scenario definitions (custom scenarios from the
/// config file go through here before the engine accepts them).
pub fn validate_scenarios(scenarios: &[ScenarioDefinition]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (i, scenario) in scenarios.iter().enumerate() {
        if scenario.id.trim().is_empty() {
            errors.push(format!("scenarios[{}].id: must not be empty", i));
        }
        if scenario.name.trim().is_empty() {
            errors.push(format!("scenarios[{}].name: must not be empty", i));
        }
        for (factor, delta) in &scenario.modifications {
            check_delta(*delta, &format!("scenarios[{}].modifications.{}", i, factor), &mut errors);
        }
        for (business, overrides) in &scenario.business_overrides {
            for (factor, delta) in overrides {
                check_delta(
                    *delta,
                    &format!(
                        "scenarios[{}].business_overrides.{}.{}",
                        i, business, factor
                    ),
                    &mut errors,
                );
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_weight_table(table: &WeightMap, path: &str, errors: &mut Vec<String>) {
    if table.is_empty() {
        errors.push(format!("{}: must not be empty", path));
        return;
    }
    for (factor, weight) in table {
        if *weight < 0.0 || !weight.is_finite() {
            errors.push(format!(
                "{}.{}: must be non-negative (got {})",
                path, factor, weight
            ));
        }
    }
    let total: f64 = table.values().sum();
    if total <= 0.0 {
        errors.push(format!("{}: weights must not all be zero", path));
    }
}

fn check_delta(delta: f64, path: &str, errors: &mut Vec<String>) {
    if !delta.is_finite() || delta <= -1.0 {
        errors.push(format!(
            "{}: delta must be a finite number greater than -1.0 (got {})",
            path, delta
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::weights::Factor;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = EngineConfig::default();
        config
            .business_weights
            .get_mut("cafe")
            .unwrap()
            .insert(Factor::Customer, -0.1);
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.contains("business_weights.cafe.customer")));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = EngineConfig::default();
        config.default_capacity_ratio = 0.0;
        config.simulation.runs = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_custom_scenario_delta_bounds() {
        let mut modifications = BTreeMap::new();
        modifications.insert(Factor::Competition, -1.5);
        let scenario = ScenarioDefinition {
            id: "crash".to_string(),
            name: "Crash".to_string(),
            description: String::new(),
            modifications,
            business_overrides: BTreeMap::new(),
        };
        let errors = validate_scenarios(&[scenario]).unwrap_err();
        assert!(errors[0].contains("scenarios[0].modifications.competition"));
    }

    #[test]
    fn test_empty_scenario_id_rejected() {
        let scenario = ScenarioDefinition {
            id: String::new(),
            name: "Unnamed".to_string(),
            description: String::new(),
            modifications: BTreeMap::new(),
            business_overrides: BTreeMap::new(),
        };
        let errors = validate_scenarios(&[scenario]).unwrap_err();
        assert!(errors[0].contains("scenarios[0].id"));
    }
}
