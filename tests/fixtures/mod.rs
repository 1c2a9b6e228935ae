//! Test fixtures for roadtrip-planner.
//!
//! Provides realistic test data including:
//! - Real places along a Texas to Maryland route
//! - Builders for trips, scenarios and legs

#![allow(dead_code)]

pub mod trip_places;

use std::collections::BTreeMap;

use roadtrip_planner::calendar::{parse_date_iso, parse_local_date_time, parse_time_hhmm};
use roadtrip_planner::model::{
    DayOverride, DayOverrideMode, DayTripPlan, DwellBlock, Leg, LegKind, Scenario, ScenarioSettings, Trip,
    TripWindow,
};

pub use trip_places::*;

pub fn date(iso: &str) -> chrono::NaiveDate {
    parse_date_iso(iso).expect("valid date")
}

pub fn at(date_iso: &str, hhmm: &str) -> chrono::NaiveDateTime {
    parse_local_date_time(date_iso, hhmm).expect("valid date time")
}

pub fn hours(h: u64) -> u64 {
    h * 3600
}

pub fn leg(from: &Location, to: &Location, duration_sec: u64, kind: LegKind) -> Leg {
    Leg::new(from.id, to.id, duration_sec, duration_sec * 25).with_kind(kind)
}

/// Builder for test trips with sensible defaults: Colorado Bend to
/// Annapolis and home to Houston, 20 minute buffers, no overrides.
#[derive(Clone, Debug)]
pub struct TripBuilder {
    start: String,
    end: String,
    start_time: String,
    end_time: String,
    return_depart: Option<chrono::NaiveDateTime>,
    buffer_minutes: u32,
    anchors: Vec<&'static str>,
    overrides: BTreeMap<chrono::NaiveDate, DayOverride>,
}

impl TripBuilder {
    pub fn new(start: &str, end: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            start_time: "09:00".to_string(),
            end_time: "23:59".to_string(),
            return_depart: None,
            buffer_minutes: 20,
            anchors: vec![ANNAPOLIS.id],
            overrides: BTreeMap::new(),
        }
    }

    pub fn times(mut self, start: &str, end: &str) -> Self {
        self.start_time = start.to_string();
        self.end_time = end.to_string();
        self
    }

    pub fn return_depart(mut self, at: chrono::NaiveDateTime) -> Self {
        self.return_depart = Some(at);
        self
    }

    pub fn buffer(mut self, minutes: u32) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    pub fn anchors(mut self, anchors: &[&'static str]) -> Self {
        self.anchors = anchors.to_vec();
        self
    }

    pub fn rest_day(mut self, iso: &str) -> Self {
        self.overrides.entry(date(iso)).or_default().mode = DayOverrideMode::Rest;
        self
    }

    pub fn dwell_block(mut self, iso: &str, id: &str, place: &Location, minutes: u32) -> Self {
        self.overrides.entry(date(iso)).or_default().dwell_blocks.push(DwellBlock {
            id: id.to_string(),
            place_id: place.id.to_string(),
            minutes,
            label: None,
        });
        self
    }

    pub fn day_trip(mut self, iso: &str, plan: DayTripPlan) -> Self {
        self.overrides.entry(date(iso)).or_default().day_trip = Some(plan);
        self
    }

    pub fn build(self) -> Trip {
        let mut window = TripWindow::new(
            date(&self.start),
            date(&self.end),
            parse_time_hhmm(&self.start_time).expect("valid start time"),
            parse_time_hhmm(&self.end_time).expect("valid end time"),
        )
        .expect("valid window");
        if let Some(at) = self.return_depart {
            window = window.with_return_depart(at);
        }

        let scenario = Scenario {
            id: "main".to_string(),
            name: "Main".to_string(),
            actual_start_place_id: COLORADO_BEND.id.to_string(),
            selected_origin_place_id: COLORADO_BEND.id.to_string(),
            return_to_place_id: HOUSTON.id.to_string(),
            intermediate_stop_place_ids: Vec::new(),
            between_anchor_stop_place_ids: Vec::new(),
            return_stop_place_ids: Vec::new(),
            anchor_place_ids: self.anchors.iter().map(|id| id.to_string()).collect(),
            settings: ScenarioSettings {
                buffer_minutes_per_stop: self.buffer_minutes,
            },
            day_overrides: self.overrides,
        };

        Trip {
            id: "trip".to_string(),
            title: "East Coast".to_string(),
            window,
            places: all_locations()
                .iter()
                .map(|loc| (loc.id.to_string(), loc.to_place()))
                .collect(),
            scenarios: [(scenario.id.clone(), scenario)].into_iter().collect(),
            active_scenario_id: "main".to_string(),
        }
    }
}
