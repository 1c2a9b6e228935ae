//! Real places along a Texas to Maryland road trip.
//!
//! Coordinates are city or park centers; good enough for haversine
//! estimates and routable with a US-wide OSRM extract.

use roadtrip_planner::model::{LatLng, Place, PlaceTag};

/// A named place with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub id: &'static str,
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub tag: PlaceTag,
}

impl Location {
    pub const fn new(id: &'static str, name: &'static str, lat: f64, lng: f64, tag: PlaceTag) -> Self {
        Self { id, name, lat, lng, tag }
    }

    pub fn lat_lng(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn to_place(&self) -> Place {
        Place {
            id: self.id.to_string(),
            name: self.name.to_string(),
            address: String::new(),
            location: self.lat_lng(),
            tags: vec![self.tag],
        }
    }
}

// ============================================================================
// Home and anchors
// ============================================================================

pub const HOUSTON: Location = Location::new("houston", "Houston", 29.7604, -95.3698, PlaceTag::Lodging);
pub const COLORADO_BEND: Location =
    Location::new("colorado_bend", "Colorado Bend State Park", 31.0087, -98.4891, PlaceTag::Park);
pub const ANNAPOLIS: Location = Location::new("annapolis", "Annapolis", 38.9784, -76.4922, PlaceTag::Anchor);
pub const LAKE_HOUSE: Location = Location::new("lake_house", "Lake House", 39.5937, -79.2673, PlaceTag::Anchor);

// ============================================================================
// Day-trip destinations
// ============================================================================

pub const NEW_YORK: Location = Location::new("nyc", "New York City", 40.7128, -74.006, PlaceTag::Attraction);
pub const PA_FRIENDS: Location = Location::new("pa_friends", "PA Friends", 40.2737, -76.8844, PlaceTag::Friend);

// ============================================================================
// Stops along the way
// ============================================================================

pub const STOPS: &[Location] = &[
    Location::new("hot_springs", "Hot Springs", 34.5219, -93.0423, PlaceTag::Attraction),
    Location::new("nashville", "Nashville", 36.1627, -86.7816, PlaceTag::Attraction),
    Location::new("mammoth_cave", "Mammoth Cave", 37.186, -86.1005, PlaceTag::Park),
    Location::new("new_river_gorge", "New River Gorge", 38.0669, -81.0796, PlaceTag::Park),
    Location::new("shenandoah", "Shenandoah", 38.5333, -78.4356, PlaceTag::Park),
];

/// Every fixture place.
pub fn all_locations() -> Vec<Location> {
    let mut all = vec![HOUSTON, COLORADO_BEND, ANNAPOLIS, LAKE_HOUSE, NEW_YORK, PA_FRIENDS];
    all.extend_from_slice(STOPS);
    all
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let all = all_locations();
        let mut ids: Vec<_> = all.iter().map(|loc| loc.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_coordinates_in_continental_us() {
        for loc in all_locations() {
            assert!(loc.lat > 24.0 && loc.lat < 50.0, "{} lat out of range", loc.name);
            assert!(loc.lng > -125.0 && loc.lng < -66.0, "{} lng out of range", loc.name);
        }
    }
}
