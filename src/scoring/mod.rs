pub mod components;
pub mod config;
pub mod engine;
pub mod validation;
pub mod weights;

pub use components::{score_components, ComponentScores};
pub use config::{business_category, BusinessCategory, EngineConfig, SimulationConfig};
pub use engine::{aggregate, quick_score, score_business, try_score, EngineError, ScoringResult};
pub use validation::{validate_config, validate_scenarios};
pub use weights::{
    resolve_weights, weight_bands, Factor, LocationType, MarketCondition, WeightBand, WeightMap,
};
