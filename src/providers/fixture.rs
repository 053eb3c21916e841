//! Deterministic canned provider for demos and tests. It stands in for the
//! real geocoding, place-search, and area-feature services so the CLI can
//! run end-to-end offline. The CLI only uses it behind an explicit
//! `--demo` flag; it is never a silent fallback.

use std::collections::BTreeMap;

use crate::context::{FeatureTag, RawContext};
use crate::providers::{
    count_categories, AreaFeatures, Coordinates, DataQuality, Geocoder, Place, PlaceSearch,
};

/// A small mixed-use district: a couple of schools, decent transit, a busy
/// cafe strip.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureProvider;

const FIXTURE_CENTER: Coordinates = Coordinates {
    lat: 10.7769,
    lon: 106.7009,
};

impl Geocoder for FixtureProvider {
    fn geocode(&self, address: &str) -> Result<Coordinates, DataQuality> {
        if address.trim().is_empty() {
            return Err(DataQuality::NotFound {
                provider: "fixture-geocoder",
                query: address.to_string(),
            });
        }
        Ok(FIXTURE_CENTER)
    }
}

impl PlaceSearch for FixtureProvider {
    fn search_places(
        &self,
        _center: Coordinates,
        _radius_m: u32,
        price_range: Option<(u8, u8)>,
    ) -> Result<Vec<Place>, DataQuality> {
        let venues: &[(&str, &str, u8)] = &[
            ("Bean There", "cafe", 2),
            ("Brew Crew", "cafe", 2),
            ("Morning Grind", "cafe", 3),
            ("Pearl Palace", "milk_tea", 1),
            ("Boba Stop", "milk_tea", 1),
            ("Quick Bites", "fast_food", 1),
            ("Corner Mart", "grocery", 1),
            ("Well Pharmacy", "pharmacy", 2),
            ("Style Studio", "hair_salon", 2),
        ];

        let places = venues
            .iter()
            .filter(|(_, _, price)| match price_range {
                Some((lo, hi)) => (lo..=hi).contains(price),
                None => true,
            })
            .enumerate()
            .map(|(i, (name, category, _))| Place {
                name: name.to_string(),
                main_category: category.to_string(),
                // Spread venues on a small deterministic grid around the center.
                lat: FIXTURE_CENTER.lat + (i as f64) * 0.0004,
                lon: FIXTURE_CENTER.lon - (i as f64) * 0.0003,
            })
            .collect();
        Ok(places)
    }
}

impl AreaFeatures for FixtureProvider {
    fn area_features(
        &self,
        _center: Coordinates,
        _radius_m: u32,
    ) -> Result<BTreeMap<FeatureTag, u32>, DataQuality> {
        Ok([
            (FeatureTag::School, 2),
            (FeatureTag::Hospital, 1),
            (FeatureTag::Pharmacy, 2),
            (FeatureTag::Police, 1),
            (FeatureTag::BusStop, 4),
            (FeatureTag::Subway, 1),
            (FeatureTag::Park, 1),
            (FeatureTag::Office, 5),
            (FeatureTag::Residential, 12),
        ]
        .into_iter()
        .collect())
    }
}

impl FixtureProvider {
    /// Raw context assembled from the fixture's own providers, the same way
    /// a real caller would combine them.
    pub fn raw_context(&self) -> RawContext {
        let center = FIXTURE_CENTER;
        // Both calls are infallible for the fixture.
        let osm = self
            .area_features(center, 500)
            .unwrap_or_default();
        let category_counts = self
            .search_places(center, 500, None)
            .map(|places| count_categories(&places))
            .unwrap_or_default();
        RawContext {
            osm,
            category_counts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_is_deterministic() {
        let provider = FixtureProvider;
        assert_eq!(provider.raw_context(), provider.raw_context());
    }

    #[test]
    fn test_fixture_context_has_cafes_and_transit() {
        let raw = FixtureProvider.raw_context();
        assert_eq!(raw.category_counts["cafe"], 3);
        assert_eq!(raw.osm[&FeatureTag::BusStop], 4);
    }

    #[test]
    fn test_price_filter_narrows_results() {
        let provider = FixtureProvider;
        let all = provider.search_places(FIXTURE_CENTER, 500, None).unwrap();
        let cheap = provider
            .search_places(FIXTURE_CENTER, 500, Some((1, 1)))
            .unwrap();
        assert!(cheap.len() < all.len());
        assert!(!cheap.is_empty());
    }

    #[test]
    fn test_empty_address_fails_geocoding() {
        let err = FixtureProvider.geocode("  ").unwrap_err();
        assert!(matches!(err, DataQuality::NotFound { .. }));
    }
}
