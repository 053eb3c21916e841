use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::scoring::Factor;
use crate::seasonal;

/// Point-of-interest categories returned by the area-feature provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTag {
    School,
    Hospital,
    Pharmacy,
    Police,
    BusStop,
    Subway,
    Park,
    Office,
    Residential,
}

impl FeatureTag {
    pub const ALL: [FeatureTag; 9] = [
        FeatureTag::School,
        FeatureTag::Hospital,
        FeatureTag::Pharmacy,
        FeatureTag::Police,
        FeatureTag::BusStop,
        FeatureTag::Subway,
        FeatureTag::Park,
        FeatureTag::Office,
        FeatureTag::Residential,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureTag::School => "school",
            FeatureTag::Hospital => "hospital",
            FeatureTag::Pharmacy => "pharmacy",
            FeatureTag::Police => "police",
            FeatureTag::BusStop => "bus_stop",
            FeatureTag::Subway => "subway",
            FeatureTag::Park => "park",
            FeatureTag::Office => "office",
            FeatureTag::Residential => "residential",
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated income band of the area, derived from office density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeLevel {
    Low,
    Medium,
    High,
}

impl IncomeLevel {
    /// Normalized purchasing-power signal used by the market-potential score.
    pub fn signal(&self) -> f64 {
        match self {
            IncomeLevel::Low => 0.35,
            IncomeLevel::Medium => 0.65,
            IncomeLevel::High => 0.90,
        }
    }

    /// Multiplier on estimated market capacity.
    pub fn capacity_factor(&self) -> f64 {
        match self {
            IncomeLevel::Low => 0.8,
            IncomeLevel::Medium => 1.0,
            IncomeLevel::High => 1.25,
        }
    }

    /// Price band the area supports (1-4 scale, aligned with price_level).
    pub fn price_band(&self) -> u8 {
        match self {
            IncomeLevel::Low => 1,
            IncomeLevel::Medium => 2,
            IncomeLevel::High => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IncomeLevel::Low => "low",
            IncomeLevel::Medium => "medium",
            IncomeLevel::High => "high",
        }
    }
}

/// Target customer group the user wants to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    Student,
    Office,
    Family,
    Tourist,
    Elderly,
    YoungProfessional,
    General,
}

impl CustomerSegment {
    pub fn as_str(&self) -> &'static str {
        match self {
            CustomerSegment::Student => "student",
            CustomerSegment::Office => "office",
            CustomerSegment::Family => "family",
            CustomerSegment::Tourist => "tourist",
            CustomerSegment::Elderly => "elderly",
            CustomerSegment::YoungProfessional => "young_professional",
            CustomerSegment::General => "general",
        }
    }
}

impl FromStr for CustomerSegment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(CustomerSegment::Student),
            "office" => Ok(CustomerSegment::Office),
            "family" => Ok(CustomerSegment::Family),
            "tourist" => Ok(CustomerSegment::Tourist),
            "elderly" => Ok(CustomerSegment::Elderly),
            "young_professional" | "young-professional" => Ok(CustomerSegment::YoungProfessional),
            "general" => Ok(CustomerSegment::General),
            other => Err(format!(
                "unknown customer segment '{}' (expected student, office, family, tourist, elderly, young_professional, or general)",
                other
            )),
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request user choices that shape the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserInputs {
    pub customer_target: CustomerSegment,
    /// Intended price positioning, 1 (budget) to 4 (premium).
    pub price_level: u8,
}

impl Default for UserInputs {
    fn default() -> Self {
        Self {
            customer_target: CustomerSegment::General,
            price_level: 2,
        }
    }
}

/// Raw area signals as delivered by the providers (or a context JSON file).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContext {
    /// Feature counts from the area-feature provider.
    #[serde(default)]
    pub osm: BTreeMap<FeatureTag, u32>,
    /// Existing businesses per category from the place-search provider.
    #[serde(default)]
    pub category_counts: BTreeMap<String, u32>,
}

/// Snapshot of everything the engine knows about one site.
///
/// Built once per analysis request from provider outputs; scoring never
/// mutates it. Scenario and Monte Carlo runs clone it before applying any
/// changes, so a context can be shared across concurrent analyses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketContext {
    pub osm_counts: BTreeMap<FeatureTag, u32>,
    pub category_counts: BTreeMap<String, u32>,
    /// Estimated residents in the search radius (residential units x 50).
    pub population_density: f64,
    pub income_level: IncomeLevel,
    /// Combined transport and walkability signal in [0, 1].
    pub foot_traffic_score: f64,
    /// Rent band 1 (cheap) to 4 (prime), from commercial activity.
    pub rent_level: u8,
    /// Month- and segment-dependent demand multiplier, always > 0.
    pub seasonal_factor: f64,
    /// Factor deltas recorded by the scenario planner; empty otherwise.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scenario_adjustments: BTreeMap<Factor, f64>,
}

impl MarketContext {
    /// Build a context from raw signals, deriving the aggregate fields.
    ///
    /// `month` is 1-12; the seasonal calendar treats anything else as a
    /// neutral 1.0 multiplier.
    pub fn from_raw(raw: RawContext, segment: CustomerSegment, month: u32) -> Self {
        let residential = raw.osm.get(&FeatureTag::Residential).copied().unwrap_or(0);
        let office = raw.osm.get(&FeatureTag::Office).copied().unwrap_or(0);
        let subway = raw.osm.get(&FeatureTag::Subway).copied().unwrap_or(0);
        let bus_stop = raw.osm.get(&FeatureTag::BusStop).copied().unwrap_or(0);
        let park = raw.osm.get(&FeatureTag::Park).copied().unwrap_or(0);
        let school = raw.osm.get(&FeatureTag::School).copied().unwrap_or(0);

        Self {
            population_density: f64::from(residential) * 50.0,
            income_level: derive_income_level(office, residential),
            foot_traffic_score: derive_foot_traffic(bus_stop, subway, park, school),
            rent_level: derive_rent_level(office, subway),
            seasonal_factor: seasonal::segment_multiplier(segment, month),
            osm_counts: raw.osm,
            category_counts: raw.category_counts,
            scenario_adjustments: BTreeMap::new(),
        }
    }

    /// Count for a feature tag; missing tags read as zero.
    pub fn feature(&self, tag: FeatureTag) -> u32 {
        self.osm_counts.get(&tag).copied().unwrap_or(0)
    }

    /// Existing competitors in the candidate category; missing reads as zero.
    pub fn competitors(&self, business_id: &str) -> u32 {
        self.category_counts.get(business_id).copied().unwrap_or(0)
    }

    pub fn total_businesses(&self) -> u32 {
        self.category_counts.values().sum()
    }

    /// Fraction of the known feature tags with a non-zero count.
    /// Used as a data-quality signal when scoring rule confidence.
    pub fn data_completeness(&self) -> f64 {
        let populated = FeatureTag::ALL
            .iter()
            .filter(|tag| self.feature(**tag) > 0)
            .count();
        populated as f64 / FeatureTag::ALL.len() as f64
    }
}

fn derive_income_level(office: u32, residential: u32) -> IncomeLevel {
    let office_density = f64::from(office) / f64::from(residential.max(1));
    if office_density > 0.3 {
        IncomeLevel::High
    } else if office_density > 0.1 {
        IncomeLevel::Medium
    } else {
        IncomeLevel::Low
    }
}

fn derive_foot_traffic(bus_stop: u32, subway: u32, park: u32, school: u32) -> f64 {
    let transport =
        ((f64::from(bus_stop) * 0.3 + f64::from(subway) * 0.7) / 5.0).clamp(0.0, 1.0);
    let walkability = (f64::from(park + school) / 5.0).clamp(0.0, 1.0);
    transport * 0.7 + walkability * 0.3
}

fn derive_rent_level(office: u32, subway: u32) -> u8 {
    let commercial_activity = office + subway * 2;
    if commercial_activity > 15 {
        4
    } else if commercial_activity >= 8 {
        3
    } else if commercial_activity >= 3 {
        2
    } else {
        1
    }
}
