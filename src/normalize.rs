//! Normalization boundary for stored and shared trip documents.
//!
//! Saved trips drift: fields go missing, day overrides carry the legacy
//! `presetDayTrip` field, minutes arrive as fractional numbers. Everything is
//! defaulted and migrated here, once, so the scheduler only ever sees the
//! current [`Trip`] shape.

use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info};

use crate::calendar::{make_local_date_time, parse_date_iso, parse_time_hhmm};
use crate::config::TripDefaults;
use crate::error::{Error, Result};
use crate::model::{
    DayOverride, DayOverrideMode, DayTripPlan, DayTripPreset, DwellBlock, Place, PlaceId, Scenario, ScenarioSettings,
    Trip, TripWindow,
};

/// Latest document version this crate reads.
pub const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TripDocument {
    Wrapped {
        #[serde(default)]
        v: Option<u32>,
        trip: StoredTrip,
    },
    Bare(StoredTrip),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTrip {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "startDateISO")]
    pub start_date_iso: String,
    #[serde(rename = "endDateISO")]
    pub end_date_iso: String,
    #[serde(rename = "startTimeHHMM", default)]
    pub start_time_hhmm: Option<String>,
    #[serde(rename = "endTimeHHMM", default)]
    pub end_time_hhmm: Option<String>,
    #[serde(rename = "returnDepartDateISO", default)]
    pub return_depart_date_iso: Option<String>,
    #[serde(rename = "returnDepartTimeHHMM", default)]
    pub return_depart_time_hhmm: Option<String>,
    #[serde(rename = "placesById", default)]
    pub places: BTreeMap<PlaceId, Place>,
    #[serde(rename = "scenariosById", default)]
    pub scenarios: BTreeMap<String, StoredScenario>,
    #[serde(default)]
    pub active_scenario_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredScenario {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub actual_start_place_id: Option<PlaceId>,
    pub selected_origin_place_id: PlaceId,
    #[serde(default)]
    pub return_to_place_id: Option<PlaceId>,
    #[serde(default)]
    pub intermediate_stop_place_ids: Vec<PlaceId>,
    #[serde(default, alias = "postAnnapolisStopPlaceIds")]
    pub between_anchor_stop_place_ids: Vec<PlaceId>,
    #[serde(default)]
    pub return_stop_place_ids: Vec<PlaceId>,
    #[serde(default)]
    pub anchor_place_ids: Vec<PlaceId>,
    #[serde(default)]
    pub settings: Option<StoredSettings>,
    #[serde(rename = "dayOverridesByISO", default)]
    pub day_overrides: BTreeMap<String, StoredDayOverride>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSettings {
    #[serde(default)]
    pub buffer_minutes_per_stop: Option<f64>,
}

/// A day override in any shape ever saved.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDayOverride {
    #[serde(default)]
    pub mode: DayOverrideMode,
    #[serde(default)]
    pub base_place_id: Option<PlaceId>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Legacy: superseded by `day_trip`.
    #[serde(default)]
    pub preset_day_trip: Option<DayTripPreset>,
    #[serde(default)]
    pub day_trip: Option<StoredDayTripPlan>,
    #[serde(default)]
    pub dwell_blocks: Vec<StoredDwellBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDayTripPlan {
    pub preset: DayTripPreset,
    #[serde(default)]
    pub destination_place_id: Option<PlaceId>,
    #[serde(default)]
    pub start_place_id: Option<PlaceId>,
    #[serde(default)]
    pub end_place_id: Option<PlaceId>,
    #[serde(default)]
    pub dwell_minutes: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDwellBlock {
    pub id: String,
    pub place_id: PlaceId,
    #[serde(default)]
    pub minutes: f64,
    #[serde(default)]
    pub label: Option<String>,
}

/// Parse a trip from JSON text, either a wrapped export
/// (`{ "v": 1, "trip": { ... } }`) or a bare stored trip.
pub fn decode_trip_json(json: &str, defaults: &TripDefaults) -> Result<Trip> {
    let stored = match serde_json::from_str::<TripDocument>(json) {
        Ok(TripDocument::Wrapped { v: Some(v), .. }) if v != CURRENT_VERSION => {
            return Err(Error::UnsupportedVersion(v));
        }
        Ok(TripDocument::Wrapped { trip, .. } | TripDocument::Bare(trip)) => trip,
        // Re-parse as a bare trip for a precise error message.
        Err(_) => serde_json::from_str::<StoredTrip>(json)?,
    };
    normalize_trip(stored, defaults)
}

/// Default and migrate a stored trip into the current shape.
pub fn normalize_trip(stored: StoredTrip, defaults: &TripDefaults) -> Result<Trip> {
    let start_date = parse_date_iso(&stored.start_date_iso)?;
    let end_date = parse_date_iso(&stored.end_date_iso)?;
    let start_time = optional_time(stored.start_time_hhmm.as_deref())?.unwrap_or(defaults.start_time);
    let end_time = optional_time(stored.end_time_hhmm.as_deref())?.unwrap_or(defaults.end_time);
    let mut window = TripWindow::new(start_date, end_date, start_time, end_time)?;

    if let Some(date_iso) = &stored.return_depart_date_iso {
        let date = parse_date_iso(date_iso)?;
        let time = optional_time(stored.return_depart_time_hhmm.as_deref())?.unwrap_or(end_time);
        window = window.with_return_depart(make_local_date_time(date, time));
    }

    let mut scenarios = BTreeMap::new();
    for (key, scenario) in stored.scenarios {
        let scenario = normalize_scenario(key.clone(), scenario, defaults)?;
        scenarios.insert(key, scenario);
    }

    let active_scenario_id = match stored.active_scenario_id {
        Some(id) if scenarios.contains_key(&id) => id,
        _ => scenarios.keys().next().cloned().ok_or(Error::NoScenarios)?,
    };

    debug!(scenarios = scenarios.len(), places = stored.places.len(), "normalized trip");
    Ok(Trip {
        id: stored.id,
        title: stored.title,
        window,
        places: stored.places,
        scenarios,
        active_scenario_id,
    })
}

fn normalize_scenario(key: String, stored: StoredScenario, defaults: &TripDefaults) -> Result<Scenario> {
    let origin = stored.selected_origin_place_id;
    let buffer_minutes = stored
        .settings
        .and_then(|settings| settings.buffer_minutes_per_stop)
        .map_or(defaults.buffer_minutes, whole_minutes);

    let mut day_overrides = BTreeMap::new();
    for (day_iso, day_override) in stored.day_overrides {
        let day = parse_date_iso(&day_iso)?;
        day_overrides.insert(day, migrate_day_override(day_override, defaults));
    }

    Ok(Scenario {
        id: stored.id.filter(|id| !id.is_empty()).unwrap_or(key),
        name: stored.name,
        actual_start_place_id: stored.actual_start_place_id.unwrap_or_else(|| origin.clone()),
        return_to_place_id: stored.return_to_place_id.unwrap_or_else(|| origin.clone()),
        selected_origin_place_id: origin,
        intermediate_stop_place_ids: stored.intermediate_stop_place_ids,
        between_anchor_stop_place_ids: stored.between_anchor_stop_place_ids,
        return_stop_place_ids: stored.return_stop_place_ids,
        anchor_place_ids: stored.anchor_place_ids,
        settings: ScenarioSettings {
            buffer_minutes_per_stop: buffer_minutes,
        },
        day_overrides,
    })
}

/// One-time migration of a stored override into the current shape.
///
/// A legacy `presetDayTrip` becomes a `dayTrip` unless one already exists.
pub fn migrate_day_override(stored: StoredDayOverride, defaults: &TripDefaults) -> DayOverride {
    let day_trip = match (stored.day_trip, stored.preset_day_trip) {
        (Some(plan), _) => Some(DayTripPlan {
            preset: plan.preset,
            destination_place_id: plan.destination_place_id,
            start_place_id: plan.start_place_id,
            end_place_id: plan.end_place_id,
            dwell_minutes: whole_minutes(plan.dwell_minutes),
        }),
        (None, Some(preset)) => {
            info!(?preset, "migrating legacy preset day trip");
            Some(DayTripPlan {
                preset,
                destination_place_id: None,
                start_place_id: None,
                end_place_id: None,
                dwell_minutes: defaults.legacy_day_trip_dwell_minutes,
            })
        }
        (None, None) => None,
    };

    DayOverride {
        mode: stored.mode,
        base_place_id: stored.base_place_id,
        notes: stored.notes,
        day_trip,
        dwell_blocks: stored
            .dwell_blocks
            .into_iter()
            .map(|block| DwellBlock {
                id: block.id,
                place_id: block.place_id,
                minutes: whole_minutes(block.minutes),
                label: block.label,
            })
            .collect(),
    }
}

fn optional_time(raw: Option<&str>) -> Result<Option<chrono::NaiveTime>> {
    raw.map(parse_time_hhmm).transpose()
}

/// Round to whole minutes; negative and non-finite values become zero.
fn whole_minutes(minutes: f64) -> u32 {
    if minutes.is_finite() && minutes > 0.0 {
        minutes.round().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}
