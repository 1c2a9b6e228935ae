//! Trip data model.
//!
//! These are the normalized shapes the scheduler consumes. Stored or shared
//! documents go through [`crate::normalize`] before they become a [`Trip`].

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::{self, hhmm};
use crate::error::{Error, Result};

/// Identifier of a [`Place`] in the trip's place table.
pub type PlaceId = String;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceTag {
    Lodging,
    Anchor,
    Attraction,
    Friend,
    Park,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub address: String,
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<PlaceTag>,
}

/// The calendar window a trip must fit in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripWindow {
    #[serde(rename = "startDateISO")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDateISO")]
    pub end_date: NaiveDate,
    /// Earliest departure on each driving day.
    #[serde(rename = "startTimeHHMM", with = "hhmm")]
    pub start_time: NaiveTime,
    /// Arrival cutoff on the last day.
    #[serde(rename = "endTimeHHMM", with = "hhmm")]
    pub end_time: NaiveTime,
    /// Requested departure of the drive home. `None` means as late as the cutoff allows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_depart: Option<NaiveDateTime>,
}

impl TripWindow {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, start_time: NaiveTime, end_time: NaiveTime) -> Result<Self> {
        if end_date < start_date {
            return Err(Error::InvalidWindow {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            start_date,
            end_date,
            start_time,
            end_time,
            return_depart: None,
        })
    }

    pub fn with_return_depart(mut self, return_depart: NaiveDateTime) -> Self {
        self.return_depart = Some(return_depart);
        self
    }

    pub fn day_count(&self) -> usize {
        calendar::diff_days_inclusive(self.start_date, self.end_date)
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        calendar::days_inclusive(self.start_date, self.end_date)
    }

    /// The instant the traveler must be home by.
    pub fn cutoff(&self) -> NaiveDateTime {
        calendar::make_local_date_time(self.end_date, self.end_time)
    }

    pub fn day_start(&self, day: NaiveDate) -> NaiveDateTime {
        calendar::make_local_date_time(day, self.start_time)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOverrideMode {
    /// Driving allowed.
    #[default]
    Auto,
    /// No new drives depart on this day.
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayTripPreset {
    #[serde(rename = "NYC")]
    Nyc,
    #[serde(rename = "PA")]
    Pa,
    #[serde(rename = "CUSTOM")]
    Custom,
}

impl DayTripPreset {
    /// Whether `place` is the destination a named preset stands for.
    /// `Custom` never matches; it names its destination explicitly.
    pub fn matches(&self, place: &Place) -> bool {
        let name = place.name.to_lowercase();
        match self {
            Self::Nyc => name.contains("new york"),
            Self::Pa => name.contains("pa friends"),
            Self::Custom => false,
        }
    }
}

/// A there-and-back excursion planned for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTripPlan {
    pub preset: DayTripPreset,
    /// Required when `preset` is `Custom`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_place_id: Option<PlaceId>,
    /// Defaults to where the traveler is at the start of that day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_place_id: Option<PlaceId>,
    /// Defaults to the start place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_place_id: Option<PlaceId>,
    pub dwell_minutes: u32,
}

/// Non-driving time pinned to a place on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DwellBlock {
    pub id: String,
    pub place_id: PlaceId,
    pub minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayOverride {
    #[serde(default)]
    pub mode: DayOverrideMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_place_id: Option<PlaceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_trip: Option<DayTripPlan>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dwell_blocks: Vec<DwellBlock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSettings {
    pub buffer_minutes_per_stop: u32,
}

/// One plan variant of a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: String,
    pub name: String,
    /// Where the traveler physically starts; may differ from the route origin.
    pub actual_start_place_id: PlaceId,
    pub selected_origin_place_id: PlaceId,
    pub return_to_place_id: PlaceId,
    /// Stops on the way to the first anchor.
    pub intermediate_stop_place_ids: Vec<PlaceId>,
    /// Stops between the first and the last anchor.
    pub between_anchor_stop_place_ids: Vec<PlaceId>,
    /// Stops on the drive home.
    pub return_stop_place_ids: Vec<PlaceId>,
    pub anchor_place_ids: Vec<PlaceId>,
    pub settings: ScenarioSettings,
    #[serde(rename = "dayOverridesByISO")]
    pub day_overrides: BTreeMap<NaiveDate, DayOverride>,
}

impl Scenario {
    pub fn day_override(&self, day: NaiveDate) -> Option<&DayOverride> {
        self.day_overrides.get(&day)
    }

    pub fn is_rest_day(&self, day: NaiveDate) -> bool {
        self.day_override(day)
            .is_some_and(|o| o.mode == DayOverrideMode::Rest)
    }

    pub fn dwell_blocks_on(&self, day: NaiveDate) -> &[DwellBlock] {
        self.day_override(day)
            .map(|o| o.dwell_blocks.as_slice())
            .unwrap_or_default()
    }

    pub fn buffer_sec(&self) -> u64 {
        u64::from(self.settings.buffer_minutes_per_stop) * 60
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub title: String,
    pub window: TripWindow,
    #[serde(rename = "placesById")]
    pub places: BTreeMap<PlaceId, Place>,
    #[serde(rename = "scenariosById")]
    pub scenarios: BTreeMap<String, Scenario>,
    pub active_scenario_id: String,
}

impl Trip {
    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.get(id)
    }

    pub fn has_place(&self, id: &str) -> bool {
        self.places.contains_key(id)
    }

    pub fn scenario(&self, id: &str) -> Result<&Scenario> {
        self.scenarios
            .get(id)
            .ok_or_else(|| Error::UnknownScenario(id.to_string()))
    }

    pub fn active_scenario(&self) -> Result<&Scenario> {
        self.scenario(&self.active_scenario_id)
    }

    /// Display label for non-driving time at a place.
    pub fn time_at_label(&self, place_id: &str) -> String {
        let name = self.place(place_id).map_or("stop", |p| p.name.as_str());
        format!("Time at {name}")
    }
}

/// Which logical segment of the trip a leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Outbound, scheduled as early as possible.
    Up,
    /// Return, scheduled to land as late as the cutoff allows.
    Home,
    /// Between anchors or side trips.
    #[default]
    Other,
}

impl LegKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Home => "home",
            Self::Other => "other",
        }
    }
}

/// One directed drive between two places with fixed duration and distance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub from_place_id: PlaceId,
    pub to_place_id: PlaceId,
    pub duration_sec: u64,
    pub distance_meters: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_address: Option<String>,
    #[serde(default)]
    pub kind: LegKind,
}

impl Leg {
    pub fn new(from: impl Into<PlaceId>, to: impl Into<PlaceId>, duration_sec: u64, distance_meters: u64) -> Self {
        Self {
            from_place_id: from.into(),
            to_place_id: to.into(),
            duration_sec,
            distance_meters,
            start_address: None,
            end_address: None,
            kind: LegKind::Other,
        }
    }

    pub fn with_kind(mut self, kind: LegKind) -> Self {
        self.kind = kind;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Drive,
    Dwell,
}

/// Where a dwell event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DwellSource {
    DayTrip,
    #[serde(rename_all = "camelCase")]
    DwellBlock { block_id: String },
    /// Placeholder time at a stop nobody has sized yet.
    ImplicitArrival,
}

/// A scheduled drive chunk or dwell block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledLeg {
    pub from_place_id: PlaceId,
    pub to_place_id: PlaceId,
    pub duration_sec: u64,
    pub distance_meters: u64,
    #[serde(rename = "departAtISO")]
    pub depart_at: NaiveDateTime,
    #[serde(rename = "arriveAtISO")]
    pub arrive_at: NaiveDateTime,
    #[serde(rename = "dayISO")]
    pub day: NaiveDate,
    pub buffer_sec: u64,
    pub kind: LegKind,
    /// False on every chunk of a midnight-split drive except the last.
    pub arrives_at_destination: bool,
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dwell_source: Option<DwellSource>,
}

impl ScheduledLeg {
    pub fn is_drive(&self) -> bool {
        self.event_type == EventType::Drive
    }

    pub fn is_dwell(&self) -> bool {
        self.event_type == EventType::Dwell
    }
}

/// One calendar day of the itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayItinerary {
    #[serde(rename = "dayISO")]
    pub day: NaiveDate,
    pub legs: Vec<ScheduledLeg>,
    pub total_drive_sec: u64,
    pub warnings: Vec<String>,
}

impl DayItinerary {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            legs: Vec::new(),
            total_drive_sec: 0,
            warnings: Vec::new(),
        }
    }

    /// Adds a warning unless the same text is already attached.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    pub fn drives(&self) -> impl Iterator<Item = &ScheduledLeg> {
        self.legs.iter().filter(|leg| leg.is_drive())
    }

    pub fn dwells(&self) -> impl Iterator<Item = &ScheduledLeg> {
        self.legs.iter().filter(|leg| leg.is_dwell())
    }
}
