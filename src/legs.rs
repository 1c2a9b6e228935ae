//! Turning a scenario into routable segments, and routing answers into legs.

use serde::{Deserialize, Serialize};

use crate::model::{Leg, LegKind, PlaceId, Scenario, Trip};
use crate::traits::RouteLeg;

/// An ordered run of places routed as one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSpec {
    pub place_ids: Vec<PlaceId>,
    pub kind: LegKind,
}

/// Tie a routing answer to the place ids it was requested for.
///
/// Leg `i` runs from `place_ids[i]` to `place_ids[i + 1]`; legs without both
/// endpoints are dropped. Missing figures count as zero.
pub fn normalize_route_legs(place_ids: &[PlaceId], route_legs: &[RouteLeg]) -> Vec<Leg> {
    route_legs
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let from = place_ids.get(i)?;
            let to = place_ids.get(i + 1)?;
            Some(Leg {
                from_place_id: from.clone(),
                to_place_id: to.clone(),
                duration_sec: non_negative(raw.duration_sec),
                distance_meters: non_negative(raw.distance_meters),
                start_address: raw.start_address.clone(),
                end_address: raw.end_address.clone(),
                kind: LegKind::Other,
            })
        })
        .collect()
}

/// Tag every leg with the segment it belongs to.
pub fn tag_legs(legs: Vec<Leg>, kind: LegKind) -> Vec<Leg> {
    legs.into_iter().map(|leg| leg.with_kind(kind)).collect()
}

fn non_negative(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.round() as u64,
        _ => 0,
    }
}

/// Split a scenario into the segments the router is asked for.
///
/// Anchors divide the trip: origin to the first anchor is the outbound run,
/// first to last anchor is a separate run, and last anchor back to the
/// return place is the drive home. A lone anchor is both first and last.
pub fn build_segment_specs(trip: &Trip, scenario: &Scenario) -> Vec<SegmentSpec> {
    let actual_start = &scenario.actual_start_place_id;
    let origin = &scenario.selected_origin_place_id;
    let return_to = &scenario.return_to_place_id;

    let mut specs = Vec::new();

    if actual_start != origin {
        specs.push(SegmentSpec {
            place_ids: vec![actual_start.clone(), origin.clone()],
            kind: LegKind::Up,
        });
    }

    let anchors: Vec<&PlaceId> = scenario
        .anchor_place_ids
        .iter()
        .filter(|id| *id != origin && *id != return_to)
        .collect();
    let first_anchor = anchors.first().copied();
    let last_anchor = if anchors.len() > 1 { anchors.last().copied() } else { None };

    let stops_between = |stops: &[PlaceId], from: &PlaceId, to: &PlaceId| -> Vec<PlaceId> {
        stops
            .iter()
            .filter(|id| *id != from && *id != to && trip.has_place(id))
            .cloned()
            .collect()
    };

    if let Some(first) = first_anchor.filter(|first| *first != origin) {
        let mut ids = vec![origin.clone()];
        ids.extend(stops_between(&scenario.intermediate_stop_place_ids, origin, first));
        ids.push(first.clone());
        specs.push(SegmentSpec {
            place_ids: ids,
            kind: LegKind::Up,
        });
    }

    if let (Some(first), Some(last)) = (first_anchor, last_anchor) {
        if first != last {
            let mut ids = vec![first.clone()];
            ids.extend(stops_between(&scenario.between_anchor_stop_place_ids, first, last));
            ids.push(last.clone());
            specs.push(SegmentSpec {
                place_ids: ids,
                kind: LegKind::Other,
            });
        }
    }

    if let Some(last) = last_anchor.or(first_anchor).filter(|last| *last != return_to) {
        let mut ids = vec![last.clone()];
        ids.extend(stops_between(&scenario.return_stop_place_ids, last, return_to));
        ids.push(return_to.clone());
        specs.push(SegmentSpec {
            place_ids: ids,
            kind: LegKind::Home,
        });
    }

    specs
        .into_iter()
        .map(|spec| SegmentSpec {
            place_ids: spec.place_ids.into_iter().filter(|id| trip.has_place(id)).collect(),
            kind: spec.kind,
        })
        .filter(|spec| spec.place_ids.len() >= 2)
        .collect()
}
