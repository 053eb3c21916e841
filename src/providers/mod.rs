//! External collaborator boundary.
//!
//! The engine itself never talks to a network. Everything location-shaped
//! comes in through these traits, and every call returns an explicit
//! `Result` so the caller decides how to degrade; nothing silently falls
//! back to demo data.

pub mod fixture;

pub use fixture::FixtureProvider;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::{FeatureTag, RawContext};

/// Why a collaborator could not deliver data.
#[derive(Debug, Error)]
pub enum DataQuality {
    #[error("{provider} could not resolve '{query}'")]
    NotFound { provider: &'static str, query: String },
    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: &'static str, reason: String },
}

/// A geographic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// One existing venue near a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub main_category: String,
    pub lat: f64,
    pub lon: f64,
}

/// Address to coordinates.
pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Coordinates, DataQuality>;
}

/// Nearby venues with a category tag, optionally filtered by price band.
pub trait PlaceSearch {
    fn search_places(
        &self,
        center: Coordinates,
        radius_m: u32,
        price_range: Option<(u8, u8)>,
    ) -> Result<Vec<Place>, DataQuality>;
}

/// Feature-tag counts within a radius.
pub trait AreaFeatures {
    fn area_features(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> Result<BTreeMap<FeatureTag, u32>, DataQuality>;
}

/// Collapse a place list into per-category counts.
pub fn count_categories(places: &[Place]) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for place in places {
        *counts.entry(place.main_category.clone()).or_insert(0) += 1;
    }
    counts
}

/// Load raw area signals from a context JSON file
/// (`{"osm": {...}, "category_counts": {...}}`).
pub fn load_context_file(path: &Path) -> Result<RawContext> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read context file at {}", path.display()))?;
    let raw: RawContext = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse context file at {}", path.display()))?;
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_categories() {
        let places = vec![
            Place {
                name: "Bean There".to_string(),
                main_category: "cafe".to_string(),
                lat: 0.0,
                lon: 0.0,
            },
            Place {
                name: "Brew Crew".to_string(),
                main_category: "cafe".to_string(),
                lat: 0.0,
                lon: 0.0,
            },
            Place {
                name: "Pearl Palace".to_string(),
                main_category: "milk_tea".to_string(),
                lat: 0.0,
                lon: 0.0,
            },
        ];
        let counts = count_categories(&places);
        assert_eq!(counts["cafe"], 2);
        assert_eq!(counts["milk_tea"], 1);
    }

    #[test]
    fn test_load_context_file_missing_path() {
        let err = load_context_file(Path::new("/nonexistent/context.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read context file"));
    }
}
