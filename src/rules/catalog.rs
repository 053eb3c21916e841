//! The built-in rule catalogs. Everything here is static data; conditions
//! are named predicates, not code.

use std::collections::BTreeMap;

use crate::context::{FeatureTag, IncomeLevel};
use crate::rules::predicates::Predicate;
use crate::rules::{Rule, RuleCategory, Severity};
use crate::scoring::weights::Factor;

/// Rules that apply to every business.
pub fn general_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "market_oversaturated",
            name: "Market Oversaturation",
            category: RuleCategory::Market,
            severity: Severity::Critical,
            predicate: Predicate::MarketSaturated,
            message: "The market is saturated with this kind of business",
            recommendation: "Consider a related category or a different area",
            priority: 9,
        },
        Rule {
            id: "high_competition",
            name: "High Competition",
            category: RuleCategory::Market,
            severity: Severity::Warning,
            predicate: Predicate::ComponentBelow {
                factor: Factor::Competition,
                threshold: 0.4,
            },
            message: "Competitive pressure in the area is high",
            recommendation: "A strong differentiation strategy is required",
            priority: 7,
        },
        Rule {
            id: "low_profit_potential",
            name: "Low Profit Potential",
            category: RuleCategory::Financial,
            severity: Severity::Warning,
            predicate: Predicate::ComponentBelow {
                factor: Factor::FinancialViability,
                threshold: 0.3,
            },
            message: "Profit potential at this site looks weak",
            recommendation: "Look into a lower-cost business model",
            priority: 8,
        },
        Rule {
            id: "high_rent_area",
            name: "High Rent Area",
            category: RuleCategory::Financial,
            severity: Severity::Warning,
            predicate: Predicate::RentLevelAtLeast { level: 4 },
            message: "Commercial rents in this area run high",
            recommendation: "Consider an online-first model or a cheaper location",
            priority: 6,
        },
        Rule {
            id: "poor_safety",
            name: "Poor Safety Infrastructure",
            category: RuleCategory::Operational,
            severity: Severity::Warning,
            predicate: Predicate::SafetyInfrastructureAbsent,
            message: "No public safety infrastructure nearby",
            recommendation: "Budget for private security or pick another site",
            priority: 5,
        },
        Rule {
            id: "poor_transport",
            name: "Poor Transportation",
            category: RuleCategory::Operational,
            severity: Severity::Info,
            predicate: Predicate::ComponentBelow {
                factor: Factor::Transport,
                threshold: 0.3,
            },
            message: "The site is hard to reach by public transport",
            recommendation: "Consider delivery services or online marketing",
            priority: 4,
        },
        Rule {
            id: "declining_market",
            name: "Declining Market",
            category: RuleCategory::Strategic,
            severity: Severity::Warning,
            predicate: Predicate::ComponentBelow {
                factor: Factor::MarketPotential,
                threshold: 0.3,
            },
            message: "Market signals point downward",
            recommendation: "Research the long-term trend before committing",
            priority: 7,
        },
        Rule {
            id: "customer_mismatch",
            name: "Customer Target Mismatch",
            category: RuleCategory::Strategic,
            severity: Severity::Warning,
            predicate: Predicate::ComponentBelow {
                factor: Factor::Customer,
                threshold: 0.4,
            },
            message: "The concept fits the target customer group poorly",
            recommendation: "Change the target segment or pick a different category",
            priority: 8,
        },
    ]
}

/// Extra rules for specific business types.
pub fn business_rules() -> BTreeMap<&'static str, Vec<Rule>> {
    let mut rules: BTreeMap<&'static str, Vec<Rule>> = BTreeMap::new();

    rules.insert(
        "cafe",
        vec![
            Rule {
                id: "cafe_no_office_nearby",
                name: "No Office Buildings Nearby",
                category: RuleCategory::Market,
                severity: Severity::Warning,
                predicate: Predicate::FeatureCountBelow {
                    tag: FeatureTag::Office,
                    threshold: 2,
                },
                message: "Few office buildings around the site",
                recommendation: "Aim at students or residents instead of office workers",
                priority: 6,
            },
            Rule {
                id: "cafe_strip_crowded",
                name: "Too Many Coffee Shops",
                category: RuleCategory::Market,
                severity: Severity::Critical,
                predicate: Predicate::CategoryCountAbove {
                    category: "cafe",
                    threshold: 5,
                },
                message: "Too many cafes already operate within the radius",
                recommendation: "Pick another site or a clearly different concept",
                priority: 9,
            },
        ],
    );

    rules.insert(
        "milk_tea",
        vec![
            Rule {
                id: "milk_tea_no_students",
                name: "No Educational Institutions",
                category: RuleCategory::Market,
                severity: Severity::Warning,
                predicate: Predicate::FeatureCountBelow {
                    tag: FeatureTag::School,
                    threshold: 1,
                },
                message: "No school within the radius",
                recommendation: "Retarget the customer mix or relocate",
                priority: 7,
            },
            Rule {
                id: "milk_tea_oversaturated",
                name: "Milk Tea Market Oversaturated",
                category: RuleCategory::Market,
                severity: Severity::Blocking,
                predicate: Predicate::CategoryCountAbove {
                    category: "milk_tea",
                    threshold: 8,
                },
                message: "The milk tea market here is past saturation",
                recommendation: "Do not open another one; pick a different category",
                priority: 10,
            },
        ],
    );

    rules.insert(
        "pharmacy",
        vec![
            Rule {
                id: "pharmacy_hospital_required",
                name: "Hospital Proximity Required",
                category: RuleCategory::Legal,
                severity: Severity::Critical,
                predicate: Predicate::FeatureCountBelow {
                    tag: FeatureTag::Hospital,
                    threshold: 1,
                },
                message: "No hospital or clinic within the radius",
                recommendation: "Find a site near a hospital or clinic",
                priority: 9,
            },
            Rule {
                id: "pharmacy_license_complex",
                name: "Complex Licensing Requirements",
                category: RuleCategory::Legal,
                severity: Severity::Info,
                predicate: Predicate::Always,
                message: "Pharmacies carry heavy licensing requirements",
                recommendation: "Line up permits and certified staff early",
                priority: 8,
            },
        ],
    );

    rules.insert(
        "spa",
        vec![
            Rule {
                id: "spa_low_income_area",
                name: "Requires High Income Area",
                category: RuleCategory::Market,
                severity: Severity::Warning,
                predicate: Predicate::IncomeLevelIs {
                    level: IncomeLevel::Low,
                },
                message: "A spa needs higher-income surroundings",
                recommendation: "Adjust pricing or find a wealthier area",
                priority: 7,
            },
            Rule {
                id: "spa_parking_needed",
                name: "Parking Infrastructure Needed",
                category: RuleCategory::Operational,
                severity: Severity::Info,
                predicate: Predicate::Always,
                message: "Spa customers usually arrive by car",
                recommendation: "Secure parking on site or nearby",
                priority: 5,
            },
        ],
    );

    rules.insert(
        "gaming",
        vec![
            Rule {
                id: "gaming_student_area",
                name: "Student Population Required",
                category: RuleCategory::Market,
                severity: Severity::Critical,
                predicate: Predicate::StudentShareBelow { threshold: 0.3 },
                message: "Not enough students around the site",
                recommendation: "Move closer to schools or a younger neighborhood",
                priority: 8,
            },
            Rule {
                id: "gaming_noise_regulations",
                name: "Noise Regulation Concerns",
                category: RuleCategory::Legal,
                severity: Severity::Warning,
                predicate: Predicate::FeatureCountAbove {
                    tag: FeatureTag::Residential,
                    threshold: 10,
                },
                message: "Dense housing nearby raises noise-complaint risk",
                recommendation: "Check local noise rules and invest in insulation",
                priority: 6,
            },
        ],
    );

    rules
}

/// Rules driven by broader context rather than the site itself.
pub fn contextual_rules() -> Vec<Rule> {
    vec![
        Rule {
            id: "pandemic_exposure",
            name: "Pandemic Exposure",
            category: RuleCategory::Strategic,
            severity: Severity::Info,
            predicate: Predicate::AmongBusinesses {
                ids: &["spa", "gaming", "nail", "barbershop", "tattoo"],
            },
            message: "Close-contact businesses suffer most in an epidemic",
            recommendation: "Keep a contingency plan for health restrictions",
            priority: 6,
        },
        Rule {
            id: "seasonal_business",
            name: "Seasonal Business Pattern",
            category: RuleCategory::Strategic,
            severity: Severity::Info,
            predicate: Predicate::HighlySeasonal { min_amplitude: 0.7 },
            message: "Demand for this business is strongly seasonal",
            recommendation: "Plan staffing and cash flow around the seasons",
            priority: 4,
        },
        Rule {
            id: "digital_transformation",
            name: "Digital Transformation Required",
            category: RuleCategory::Strategic,
            severity: Severity::Info,
            predicate: Predicate::AmongBusinesses {
                ids: &["bookstore", "electronics", "clothing", "pharmacy"],
            },
            message: "Online competition is reshaping this category",
            recommendation: "Invest in an online presence from day one",
            priority: 5,
        },
    ]
}
