//! Seams between the pure scheduler and the outside world.
//!
//! The planner only needs two collaborators: something that can drive
//! between waypoints, and somewhere to remember what it answered. Hosts
//! implement them for their routing engine and cache of choice.

use crate::error::Result;
use crate::model::{LatLng, Leg};

/// A raw leg as reported by a routing engine, before it is tied to place ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteLeg {
    /// Drive time in seconds, if the engine reported one.
    pub duration_sec: Option<f64>,
    /// Drive distance in meters, if the engine reported one.
    pub distance_meters: Option<f64>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
}

/// Provides a driving route through an ordered list of waypoints.
///
/// Returns one [`RouteLeg`] per consecutive waypoint pair, in travel order.
/// Waypoint order is taken as given and never optimized.
pub trait RouteProvider {
    fn route(&self, waypoints: &[LatLng]) -> Result<Vec<RouteLeg>>;

    /// Name for logging.
    fn name(&self) -> &str;
}

/// Caller-owned memo of normalized legs, keyed by a derived string.
pub trait RouteCache {
    fn get(&self, key: &str) -> Option<Vec<Leg>>;

    fn put(&self, key: String, legs: Vec<Leg>);
}
