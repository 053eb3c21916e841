pub mod config;
pub mod context;
pub mod engine;
pub mod output;
pub mod providers;
pub mod rules;
pub mod scenario;
pub mod scoring;
pub mod seasonal;
pub mod sensitivity;
pub mod simulate;

pub use context::{CustomerSegment, FeatureTag, IncomeLevel, MarketContext, UserInputs};
pub use engine::Engine;
pub use scoring::{EngineError, Factor, ScoringResult};
