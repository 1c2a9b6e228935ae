//! End-to-end planning of a scenario: route, schedule, resolve day trips,
//! schedule again.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use crate::base_place::compute_base_place_by_day;
use crate::cache::segment_key;
use crate::day_trip::resolve_day_trips;
use crate::error::Result;
use crate::legs::{build_segment_specs, normalize_route_legs, tag_legs, SegmentSpec};
use crate::model::{Leg, PlaceId, Scenario, Trip};
use crate::scheduler::{compute_itinerary, latest_return_departure, DayTrips, ItineraryOutput};
use crate::traits::{RouteCache, RouteProvider};

/// Everything computed for one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlan {
    pub scenario_id: String,
    /// Main route legs in travel order, tagged by segment.
    pub legs: Vec<Leg>,
    pub day_trips: DayTrips,
    pub itinerary: ItineraryOutput,
    pub base_place_by_day: BTreeMap<NaiveDate, Option<PlaceId>>,
    /// Latest instant the drive home may start and still meet the cutoff.
    pub latest_return_depart: Option<NaiveDateTime>,
}

/// Route every segment of the scenario, consulting `cache` first.
pub fn route_scenario<P, C>(trip: &Trip, scenario: &Scenario, provider: &P, cache: &C) -> Result<Vec<Leg>>
where
    P: RouteProvider + ?Sized,
    C: RouteCache + ?Sized,
{
    let mut legs = Vec::new();
    for spec in build_segment_specs(trip, scenario) {
        legs.extend(route_segment(trip, &spec, provider, cache)?);
    }
    Ok(legs)
}

fn route_segment<P, C>(trip: &Trip, spec: &SegmentSpec, provider: &P, cache: &C) -> Result<Vec<Leg>>
where
    P: RouteProvider + ?Sized,
    C: RouteCache + ?Sized,
{
    let key = segment_key(spec.kind, &spec.place_ids);
    if let Some(legs) = cache.get(&key) {
        debug!(%key, "route cache hit");
        return Ok(legs);
    }

    let waypoints: Vec<_> = spec
        .place_ids
        .iter()
        .filter_map(|id| trip.place(id).map(|place| place.location))
        .collect();
    debug!(%key, provider = provider.name(), waypoints = waypoints.len(), "routing segment");
    let raw = provider.route(&waypoints)?;
    let legs = tag_legs(normalize_route_legs(&spec.place_ids, &raw), spec.kind);
    cache.put(key, legs.clone());
    Ok(legs)
}

/// Plan the scenario `scenario_id` of `trip`.
///
/// Day trips start from wherever the main itinerary leaves the traveler,
/// so the itinerary is computed once without them to find that out, and
/// again with them.
pub fn plan_scenario<P, C>(trip: &Trip, scenario_id: &str, provider: &P, cache: &C) -> Result<TripPlan>
where
    P: RouteProvider + ?Sized,
    C: RouteCache + ?Sized,
{
    let scenario = trip.scenario(scenario_id)?;
    let legs = route_scenario(trip, scenario, provider, cache)?;

    let main_only = compute_itinerary(trip, scenario, &legs, None);
    let main_base = compute_base_place_by_day(&main_only.days, scenario);
    let day_trips = resolve_day_trips(trip, scenario, &main_base, provider, cache);

    let itinerary = compute_itinerary(trip, scenario, &legs, Some(&day_trips));
    let base_place_by_day = compute_base_place_by_day(&itinerary.days, scenario);
    let latest_return_depart = latest_return_departure(&trip.window, &legs, scenario.buffer_sec());

    info!(
        scenario = scenario_id,
        legs = legs.len(),
        day_trips = day_trips.len(),
        spills = itinerary.spills_beyond_end_date,
        "scenario planned"
    );

    Ok(TripPlan {
        scenario_id: scenario_id.to_string(),
        legs,
        day_trips,
        itinerary,
        base_place_by_day,
        latest_return_depart,
    })
}

/// Plan the trip's active scenario.
pub fn plan_active_scenario<P, C>(trip: &Trip, provider: &P, cache: &C) -> Result<TripPlan>
where
    P: RouteProvider + ?Sized,
    C: RouteCache + ?Sized,
{
    plan_scenario(trip, &trip.active_scenario_id, provider, cache)
}

/// Plan every scenario of the trip in parallel, for side-by-side comparison.
pub fn plan_all_scenarios<P, C>(trip: &Trip, provider: &P, cache: &C) -> BTreeMap<String, Result<TripPlan>>
where
    P: RouteProvider + Sync + ?Sized,
    C: RouteCache + Sync + ?Sized,
{
    trip.scenarios
        .par_iter()
        .map(|(id, _)| (id.clone(), plan_scenario(trip, id, provider, cache)))
        .collect()
}
