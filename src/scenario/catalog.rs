//! The built-in scenario catalog: eight macro futures worth stress-testing
//! a site decision against. Callers can add custom definitions with the
//! same shape through the config file.

use std::collections::BTreeMap;

use crate::scenario::ScenarioDefinition;
use crate::scoring::weights::Factor;

fn deltas(entries: &[(Factor, f64)]) -> BTreeMap<Factor, f64> {
    entries.iter().copied().collect()
}

fn overrides(entries: &[(&str, &[(Factor, f64)])]) -> BTreeMap<String, BTreeMap<Factor, f64>> {
    entries
        .iter()
        .map(|(business, mods)| (business.to_string(), deltas(mods)))
        .collect()
}

pub fn built_in_scenarios() -> Vec<ScenarioDefinition> {
    use Factor::*;

    vec![
        ScenarioDefinition {
            id: "economic_downturn".to_string(),
            name: "Economic downturn".to_string(),
            description: "Regional slowdown cuts income and discretionary spending".to_string(),
            modifications: deltas(&[
                (MarketPotential, -0.3),
                (Customer, -0.2),
                (FinancialViability, -0.4),
            ]),
            business_overrides: BTreeMap::new(),
        },
        ScenarioDefinition {
            id: "strong_growth".to_string(),
            name: "Strong growth".to_string(),
            description: "The area booms: more people, more income, more rivals".to_string(),
            modifications: deltas(&[
                (MarketPotential, 0.4),
                (Customer, 0.2),
                // Attractive areas pull in new entrants too.
                (Competition, 0.3),
                (FinancialViability, 0.2),
            ]),
            business_overrides: BTreeMap::new(),
        },
        ScenarioDefinition {
            id: "infrastructure_upgrade".to_string(),
            name: "Infrastructure upgrade".to_string(),
            description: "Major investment in transit and public amenities".to_string(),
            modifications: deltas(&[
                (Transport, 0.5),
                (Safety, 0.3),
                (Landmark, 0.2),
                (MarketPotential, 0.3),
            ]),
            business_overrides: BTreeMap::new(),
        },
        ScenarioDefinition {
            id: "market_saturation".to_string(),
            name: "Market saturation".to_string(),
            description: "A wave of new entrants floods the local market".to_string(),
            modifications: deltas(&[
                (Competition, 0.5),
                (MarketPotential, -0.3),
                (FinancialViability, -0.3),
            ]),
            business_overrides: BTreeMap::new(),
        },
        ScenarioDefinition {
            id: "demographic_shift".to_string(),
            name: "Demographic shift".to_string(),
            description: "The neighborhood skews younger and spends differently".to_string(),
            modifications: deltas(&[(Customer, 0.3), (MarketPotential, 0.2)]),
            business_overrides: overrides(&[
                ("milk_tea", &[(Customer, 0.5)]),
                ("gaming", &[(Customer, 0.4)]),
                ("spa", &[(Customer, -0.2)]),
            ]),
        },
        ScenarioDefinition {
            id: "security_crisis".to_string(),
            name: "Security crisis".to_string(),
            description: "Public safety deteriorates and foot traffic follows".to_string(),
            modifications: deltas(&[
                (Safety, -0.7),
                (Customer, -0.3),
                (MarketPotential, -0.4),
            ]),
            business_overrides: BTreeMap::new(),
        },
        ScenarioDefinition {
            id: "digital_disruption".to_string(),
            name: "Digital disruption".to_string(),
            description: "E-commerce and delivery reshape who competes here".to_string(),
            modifications: deltas(&[(OperationalFeasibility, 0.2), (Competition, 0.4)]),
            business_overrides: overrides(&[
                ("bookstore", &[(Competition, 0.6), (MarketPotential, -0.4)]),
                ("electronics", &[(Competition, 0.5)]),
                ("clothing", &[(Competition, 0.45)]),
                ("grocery", &[(OperationalFeasibility, 0.4)]),
            ]),
        },
        ScenarioDefinition {
            id: "pandemic_shock".to_string(),
            name: "Pandemic shock".to_string(),
            description: "Health restrictions hit in-person trade".to_string(),
            modifications: deltas(&[
                (Customer, -0.4),
                (FinancialViability, -0.5),
                (OperationalFeasibility, -0.3),
            ]),
            business_overrides: overrides(&[
                ("spa", &[(Customer, -0.8), (OperationalFeasibility, -0.7)]),
                ("gaming", &[(Customer, -0.6), (OperationalFeasibility, -0.8)]),
                ("pharmacy", &[(Customer, 0.3), (MarketPotential, 0.4)]),
                ("grocery", &[(Customer, 0.2), (MarketPotential, 0.3)]),
            ]),
        },
    ]
}
