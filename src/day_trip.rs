//! Day trips: there-and-back excursions from wherever the traveler is.
//!
//! Resolution turns a [`DayTripPlan`] into a routed triangle
//! (start → destination → end); injection splices that triangle and the
//! time spent at the destination into the itinerary.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::cache::day_trip_key;
use crate::calendar::add_seconds;
use crate::legs::{normalize_route_legs, tag_legs};
use crate::model::{DayTripPlan, DayTripPreset, DwellSource, Leg, LegKind, PlaceId, Scenario, Trip};
use crate::scheduler::{dwell_event, DayTrips, Schedule};
use crate::traits::{RouteCache, RouteProvider};

/// A day trip with its drive legs already routed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTripRoute {
    pub destination_place_id: PlaceId,
    pub dwell_minutes: u32,
    /// Start → destination, then destination → end.
    pub legs: Vec<Leg>,
}

/// The three places a day trip visits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTripEndpoints {
    pub start: PlaceId,
    pub destination: PlaceId,
    pub end: PlaceId,
}

/// Work out where a day trip starts, goes and ends.
///
/// Returns `None` when the destination cannot be determined or any of the
/// three places is missing from the trip.
pub fn resolve_endpoints(
    trip: &Trip,
    scenario: &Scenario,
    plan: &DayTripPlan,
    base_place: Option<&PlaceId>,
) -> Option<DayTripEndpoints> {
    let destination = match plan.preset {
        DayTripPreset::Custom => plan.destination_place_id.clone()?,
        preset => trip.places.values().find(|place| preset.matches(place))?.id.clone(),
    };
    let start = plan
        .start_place_id
        .clone()
        .or_else(|| base_place.cloned())
        .unwrap_or_else(|| scenario.selected_origin_place_id.clone());
    let end = plan.end_place_id.clone().unwrap_or_else(|| start.clone());

    if ![&start, &destination, &end].iter().all(|id| trip.has_place(id)) {
        return None;
    }
    Some(DayTripEndpoints {
        start,
        destination,
        end,
    })
}

/// Route every day trip declared in the scenario's overrides.
///
/// `base_place_by_day` supplies the implicit start for plans that name none.
/// Routing failures skip that day trip.
pub fn resolve_day_trips<P, C>(
    trip: &Trip,
    scenario: &Scenario,
    base_place_by_day: &BTreeMap<NaiveDate, Option<PlaceId>>,
    provider: &P,
    cache: &C,
) -> DayTrips
where
    P: RouteProvider + ?Sized,
    C: RouteCache + ?Sized,
{
    let mut resolved = DayTrips::new();

    for (day, day_override) in &scenario.day_overrides {
        let Some(plan) = &day_override.day_trip else {
            continue;
        };
        let base_place = base_place_by_day.get(day).and_then(Option::as_ref);
        let Some(endpoints) = resolve_endpoints(trip, scenario, plan, base_place) else {
            debug!(%day, "day trip has no resolvable places");
            continue;
        };

        let key = day_trip_key(&endpoints.start, &endpoints.destination, &endpoints.end);
        let legs = match cache.get(&key) {
            Some(legs) => legs,
            None => match route_triangle(trip, &endpoints, provider) {
                Ok(legs) => {
                    cache.put(key, legs.clone());
                    legs
                }
                Err(err) => {
                    warn!(%day, provider = provider.name(), error = %err, "day trip routing failed");
                    continue;
                }
            },
        };

        resolved.insert(
            *day,
            DayTripRoute {
                destination_place_id: endpoints.destination,
                dwell_minutes: plan.dwell_minutes,
                legs,
            },
        );
    }

    resolved
}

fn route_triangle<P>(trip: &Trip, endpoints: &DayTripEndpoints, provider: &P) -> crate::Result<Vec<Leg>>
where
    P: RouteProvider + ?Sized,
{
    let ids = vec![
        endpoints.start.clone(),
        endpoints.destination.clone(),
        endpoints.end.clone(),
    ];
    let waypoints: Vec<_> = ids
        .iter()
        .filter_map(|id| trip.place(id).map(|place| place.location))
        .collect();
    let raw = provider.route(&waypoints)?;
    Ok(tag_legs(normalize_route_legs(&ids, &raw), LegKind::Other))
}

impl Schedule<'_> {
    /// Splice a day trip into `day`, starting at the daily start time.
    ///
    /// The dwell at the destination follows the first leg's arrival directly
    /// and the return leg departs when it ends. Returns true if any drive
    /// fell outside the trip window.
    pub(crate) fn inject_day_trip(&mut self, day: NaiveDate, route: &DayTripRoute) -> bool {
        if self.day_index(day).is_none() || route.legs.is_empty() {
            return false;
        }

        let trip = self.trip;
        let mut spills = false;
        let mut depart = trip.window.day_start(day);

        for (i, leg) in route.legs.iter().enumerate() {
            let outcome = self.schedule_leg(depart, leg);
            spills |= outcome.spills;
            depart = outcome.depart_after;

            if i == 0 {
                let dwell_sec = u64::from(route.dwell_minutes) * 60;
                if dwell_sec > 0 {
                    self.push_event(dwell_event(
                        &route.destination_place_id,
                        outcome.arrive_at,
                        dwell_sec,
                        trip.time_at_label(&route.destination_place_id),
                        DwellSource::DayTrip,
                    ));
                    depart = add_seconds(outcome.arrive_at, dwell_sec);
                }
            }
        }

        debug!(%day, destination = %route.destination_place_id, spills, "day trip injected");
        spills
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{parse_date_iso, parse_time_hhmm};
    use crate::model::{LatLng, Place, ScenarioSettings, TripWindow};

    fn place(id: &str, name: &str) -> (PlaceId, Place) {
        (
            id.to_string(),
            Place {
                id: id.to_string(),
                name: name.to_string(),
                address: String::new(),
                location: LatLng::new(0.0, 0.0),
                tags: Vec::new(),
            },
        )
    }

    fn fixture() -> (Trip, Scenario) {
        let trip = Trip {
            id: "t".to_string(),
            title: "t".to_string(),
            window: TripWindow::new(
                parse_date_iso("2026-01-10").unwrap(),
                parse_date_iso("2026-01-19").unwrap(),
                parse_time_hhmm("09:00").unwrap(),
                parse_time_hhmm("23:59").unwrap(),
            )
            .unwrap(),
            places: [
                place("lake", "Lake House"),
                place("nyc", "New York City"),
                place("ann", "Annapolis, MD"),
            ]
            .into_iter()
            .collect(),
            scenarios: BTreeMap::new(),
            active_scenario_id: "s".to_string(),
        };
        let scenario = Scenario {
            id: "s".to_string(),
            name: "s".to_string(),
            actual_start_place_id: "ann".to_string(),
            selected_origin_place_id: "ann".to_string(),
            return_to_place_id: "ann".to_string(),
            intermediate_stop_place_ids: Vec::new(),
            between_anchor_stop_place_ids: Vec::new(),
            return_stop_place_ids: Vec::new(),
            anchor_place_ids: Vec::new(),
            settings: ScenarioSettings {
                buffer_minutes_per_stop: 20,
            },
            day_overrides: BTreeMap::new(),
        };
        (trip, scenario)
    }

    fn plan(preset: DayTripPreset) -> DayTripPlan {
        DayTripPlan {
            preset,
            destination_place_id: None,
            start_place_id: None,
            end_place_id: None,
            dwell_minutes: 240,
        }
    }

    #[test]
    fn test_preset_resolves_by_name_and_base_place() {
        let (trip, scenario) = fixture();
        let base = "lake".to_string();
        let endpoints = resolve_endpoints(&trip, &scenario, &plan(DayTripPreset::Nyc), Some(&base)).unwrap();
        assert_eq!(endpoints.start, "lake");
        assert_eq!(endpoints.destination, "nyc");
        assert_eq!(endpoints.end, "lake");
    }

    #[test]
    fn test_start_falls_back_to_route_origin() {
        let (trip, scenario) = fixture();
        let endpoints = resolve_endpoints(&trip, &scenario, &plan(DayTripPreset::Nyc), None).unwrap();
        assert_eq!(endpoints.start, "ann");
    }

    #[test]
    fn test_custom_requires_destination() {
        let (trip, scenario) = fixture();
        assert!(resolve_endpoints(&trip, &scenario, &plan(DayTripPreset::Custom), None).is_none());

        let mut custom = plan(DayTripPreset::Custom);
        custom.destination_place_id = Some("lake".to_string());
        custom.end_place_id = Some("nyc".to_string());
        let endpoints = resolve_endpoints(&trip, &scenario, &custom, None).unwrap();
        assert_eq!(endpoints.destination, "lake");
        assert_eq!(endpoints.end, "nyc");
    }

    #[test]
    fn test_unknown_places_are_ignored() {
        let (trip, scenario) = fixture();
        // No place matches the PA preset.
        assert!(resolve_endpoints(&trip, &scenario, &plan(DayTripPreset::Pa), None).is_none());

        let mut custom = plan(DayTripPreset::Custom);
        custom.destination_place_id = Some("ghost".to_string());
        assert!(resolve_endpoints(&trip, &scenario, &custom, None).is_none());
    }
}
