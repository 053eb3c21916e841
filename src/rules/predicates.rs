use thiserror::Error;

use crate::context::{FeatureTag, IncomeLevel, MarketContext};
use crate::scoring::components::ComponentScores;
use crate::scoring::config::EngineConfig;
use crate::scoring::weights::Factor;
use crate::seasonal;

/// Why a predicate could not be evaluated. A failing predicate is treated
/// as not-triggered by the engine; the error only feeds the log line.
#[derive(Debug, Error)]
pub enum PredicateError {
    #[error("component score for '{0}' missing from the score map")]
    MissingScore(Factor),
}

/// The fixed set of named conditions a rule can reference.
///
/// Rules stay pure data this way: the catalog names a variant and its
/// parameters instead of carrying executable code.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Competitor count has reached the per-business saturation threshold.
    MarketSaturated,
    /// A component score sits below a threshold.
    ComponentBelow { factor: Factor, threshold: f64 },
    /// Strictly more than `threshold` venues of `category` nearby.
    CategoryCountAbove {
        category: &'static str,
        threshold: u32,
    },
    /// Fewer than `threshold` features of `tag` nearby.
    FeatureCountBelow { tag: FeatureTag, threshold: u32 },
    /// Strictly more than `threshold` features of `tag` nearby.
    FeatureCountAbove { tag: FeatureTag, threshold: u32 },
    /// Derived rent band at or above `level`.
    RentLevelAtLeast { level: u8 },
    /// Neither police nor hospital coverage in the radius.
    SafetyInfrastructureAbsent,
    /// Derived area income matches `level`.
    IncomeLevelIs { level: IncomeLevel },
    /// Schools per population indicator below `threshold`.
    StudentShareBelow { threshold: f64 },
    /// The candidate business id is in a fixed list.
    AmongBusinesses { ids: &'static [&'static str] },
    /// The business's seasonal pattern swings at least `min_amplitude`
    /// peak-to-trough.
    HighlySeasonal { min_amplitude: f64 },
    /// Unconditional advisory.
    Always,
}

impl Predicate {
    pub fn evaluate(
        &self,
        config: &EngineConfig,
        business_id: &str,
        ctx: &MarketContext,
        scores: &ComponentScores,
    ) -> Result<bool, PredicateError> {
        match self {
            Predicate::MarketSaturated => {
                let threshold = config.saturation_threshold(business_id);
                Ok(ctx.competitors(business_id) >= threshold)
            }
            Predicate::ComponentBelow { factor, threshold } => {
                let score = scores
                    .get(factor)
                    .ok_or(PredicateError::MissingScore(*factor))?;
                Ok(*score < *threshold)
            }
            Predicate::CategoryCountAbove {
                category,
                threshold,
            } => Ok(ctx.competitors(category) > *threshold),
            Predicate::FeatureCountBelow { tag, threshold } => {
                Ok(ctx.feature(*tag) < *threshold)
            }
            Predicate::FeatureCountAbove { tag, threshold } => {
                Ok(ctx.feature(*tag) > *threshold)
            }
            Predicate::RentLevelAtLeast { level } => Ok(ctx.rent_level >= *level),
            Predicate::SafetyInfrastructureAbsent => {
                Ok(ctx.feature(FeatureTag::Police) + ctx.feature(FeatureTag::Hospital) == 0)
            }
            Predicate::IncomeLevelIs { level } => Ok(ctx.income_level == *level),
            Predicate::StudentShareBelow { threshold } => {
                let population_indicators =
                    ctx.feature(FeatureTag::Residential) + ctx.feature(FeatureTag::Office);
                let share = if population_indicators == 0 {
                    0.0
                } else {
                    (f64::from(ctx.feature(FeatureTag::School))
                        / f64::from(population_indicators))
                    .min(1.0)
                };
                Ok(share < *threshold)
            }
            Predicate::AmongBusinesses { ids } => Ok(ids.contains(&business_id)),
            Predicate::HighlySeasonal { min_amplitude } => {
                Ok(seasonal::seasonal_amplitude(business_id) >= *min_amplitude)
            }
            Predicate::Always => Ok(true),
        }
    }
}
