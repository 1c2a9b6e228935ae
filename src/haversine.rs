//! Haversine route estimator (fallback when no routing engine is reachable).
//!
//! Uses great-circle distance stretched by a road factor to estimate each
//! leg. Less accurate than OSRM (ignores roads) but always available.

use crate::error::Result;
use crate::model::LatLng;
use crate::traits::{RouteLeg, RouteProvider};

/// Average highway speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 90.0;

/// Ratio of road distance to straight-line distance.
const DEFAULT_ROAD_FACTOR: f64 = 1.3;

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine-based route estimator.
#[derive(Debug, Clone)]
pub struct HaversineRouter {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier from straight-line to road distance.
    pub road_factor: f64,
}

impl Default for HaversineRouter {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
            road_factor: DEFAULT_ROAD_FACTOR,
        }
    }
}

impl HaversineRouter {
    pub fn new(speed_kmh: f64, road_factor: f64) -> Self {
        Self { speed_kmh, road_factor }
    }

    /// Calculate haversine distance between two points in kilometers.
    fn haversine_km(from: LatLng, to: LatLng) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_KM * c
    }

    /// Convert road distance in km to travel time in seconds.
    fn km_to_seconds(&self, km: f64) -> f64 {
        (km / self.speed_kmh * 3600.0).round()
    }

    fn estimate(&self, from: LatLng, to: LatLng) -> RouteLeg {
        let road_km = Self::haversine_km(from, to) * self.road_factor;
        RouteLeg {
            duration_sec: Some(self.km_to_seconds(road_km)),
            distance_meters: Some((road_km * 1000.0).round()),
            start_address: None,
            end_address: None,
        }
    }
}

impl RouteProvider for HaversineRouter {
    fn route(&self, waypoints: &[LatLng]) -> Result<Vec<RouteLeg>> {
        Ok(waypoints
            .windows(2)
            .map(|pair| self.estimate(pair[0], pair[1]))
            .collect())
    }

    fn name(&self) -> &str {
        "haversine"
    }
}
