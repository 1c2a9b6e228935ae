//! Itinerary scheduler.
//!
//! Lays a trip's legs out over its calendar window. Outbound legs go as early
//! as possible from the first morning; the drive home is positioned to land
//! as late as the cutoff allows. Drives are split at every local midnight so
//! each chunk belongs to the day it starts on, and every arrival gets its
//! dwell time before the next departure.
//!
//! The scheduler never fails. A plan that does not fit is reported through
//! [`ItineraryOutput::spills_beyond_end_date`] and per-day warnings.

use std::collections::{BTreeMap, HashSet};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calendar::{add_seconds, next_midnight, seconds_between, sub_seconds};
use crate::day_trip::DayTripRoute;
use crate::model::{
    DayItinerary, DwellSource, EventType, Leg, LegKind, PlaceId, Scenario, ScheduledLeg, Trip, TripWindow,
};

/// Placeholder time at a stop when the user has not declared any.
pub const IMPLICIT_DWELL_SEC: u64 = 90 * 60;

pub const NO_ROUTE_WARNING: &str = "No route yet. Add an origin + destination (anchors) to compute drive times.";
pub const REST_DAY_WARNING: &str = "Marked as Rest/Explore day; no driving scheduled.";
pub const REST_DAY_SPAN_WARNING: &str = "This day is marked Rest/Explore but a nonstop drive spans into it.";
pub const SPILL_WARNING: &str = "Schedule spills beyond the trip end date and time.";

const SECONDS_PER_DAY: u64 = 24 * 3600;

/// Day-trip routes keyed by the day they happen on.
pub type DayTrips = BTreeMap<NaiveDate, DayTripRoute>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryOutput {
    pub days: Vec<DayItinerary>,
    pub spills_beyond_end_date: bool,
}

/// Result of placing one leg.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LegOutcome {
    /// Arrival plus buffer.
    pub depart_after: NaiveDateTime,
    pub arrive_at: NaiveDateTime,
    pub spills: bool,
}

/// Where a forward pass left its cursor.
#[derive(Debug, Clone, Copy)]
struct ForwardOutcome {
    end_day_idx: usize,
    end_depart_after: NaiveDateTime,
    last_arrival: Option<NaiveDateTime>,
    spills: bool,
}

/// Mutable state of one scheduling pass. Built fresh per call.
pub(crate) struct Schedule<'a> {
    pub trip: &'a Trip,
    pub scenario: &'a Scenario,
    pub days: Vec<DayItinerary>,
    pub buffer_sec: u64,
    consumed_blocks: HashSet<String>,
}

/// Compute the day-by-day itinerary for one scenario.
///
/// `legs` are in travel order and tagged with their segment kind; legs of
/// kind [`LegKind::Home`] form the drive home, everything else is outbound.
/// `day_trips` are excursions already routed for specific days.
pub fn compute_itinerary(
    trip: &Trip,
    scenario: &Scenario,
    legs: &[Leg],
    day_trips: Option<&DayTrips>,
) -> ItineraryOutput {
    let window = &trip.window;
    let days: Vec<DayItinerary> = window.days().into_iter().map(DayItinerary::new).collect();
    debug!(days = days.len(), legs = legs.len(), scenario = %scenario.id, "computing itinerary");

    if legs.is_empty() {
        let mut days = days;
        if let Some(first) = days.first_mut() {
            first.push_warning(NO_ROUTE_WARNING);
        }
        return ItineraryOutput {
            days,
            spills_beyond_end_date: false,
        };
    }

    if days.is_empty() {
        warn!(start = %window.start_date, end = %window.end_date, "trip window has no days");
        return ItineraryOutput {
            days,
            spills_beyond_end_date: true,
        };
    }

    let mut schedule = Schedule {
        trip,
        scenario,
        days,
        buffer_sec: scenario.buffer_sec(),
        consumed_blocks: HashSet::new(),
    };
    let mut spills = false;

    let (outbound_legs, return_legs): (Vec<Leg>, Vec<Leg>) =
        legs.iter().cloned().partition(|leg| leg.kind != LegKind::Home);

    let outbound = schedule.schedule_legs_forward(0, None, &outbound_legs, LegKind::Up);
    spills |= outbound.spills;
    debug!(
        end_day = outbound.end_day_idx,
        depart_after = %outbound.end_depart_after,
        spills = outbound.spills,
        "outbound scheduled"
    );

    let latest_start = latest_return_start(window, &return_legs, schedule.buffer_sec);
    let requested = window.return_depart.unwrap_or(latest_start);
    let actual_depart = requested.min(latest_start).max(outbound.end_depart_after);
    if actual_depart > latest_start {
        warn!(%actual_depart, %latest_start, "return cannot depart in time to meet the cutoff");
        spills = true;
    }

    if !return_legs.is_empty() {
        let start_idx = schedule
            .day_index(actual_depart.date())
            .unwrap_or_else(|| outbound.end_day_idx.max(schedule.earliest_return_day_idx(&return_legs)));
        debug!(%actual_depart, start_day = start_idx, "scheduling return");
        let ret = schedule.schedule_legs_forward(start_idx, Some(actual_depart), &return_legs, LegKind::Home);
        spills |= ret.spills;
        if ret.last_arrival.is_some_and(|arrival| arrival > window.cutoff()) {
            warn!(cutoff = %window.cutoff(), "return arrives after the cutoff");
            spills = true;
        }
    }

    if let Some(day_trips) = day_trips {
        for (day, route) in day_trips {
            spills |= schedule.inject_day_trip(*day, route);
        }
    }

    schedule.lay_down_leftover_blocks();

    let mut days = schedule.days;
    if spills {
        if let Some(last) = days.last_mut() {
            last.push_warning(SPILL_WARNING);
        }
    }

    ItineraryOutput {
        days,
        spills_beyond_end_date: spills,
    }
}

fn total_drive_sec(legs: &[Leg]) -> u64 {
    legs.iter().fold(0u64, |acc, leg| acc.saturating_add(leg.duration_sec))
}

/// Latest instant the drive home may start and still arrive by the cutoff.
///
/// `None` when `legs` contain no return legs.
pub fn latest_return_departure(window: &TripWindow, legs: &[Leg], buffer_sec: u64) -> Option<NaiveDateTime> {
    let return_legs: Vec<Leg> = legs
        .iter()
        .filter(|leg| leg.kind == LegKind::Home)
        .cloned()
        .collect();
    if return_legs.is_empty() {
        return None;
    }
    Some(latest_return_start(window, &return_legs, buffer_sec))
}

/// Cutoff minus total return drive time and the buffers between return legs.
fn latest_return_start(window: &TripWindow, return_legs: &[Leg], buffer_sec: u64) -> NaiveDateTime {
    let between_buffers = (return_legs.len().saturating_sub(1) as u64).saturating_mul(buffer_sec);
    sub_seconds(window.cutoff(), total_drive_sec(return_legs).saturating_add(between_buffers))
}

impl<'a> Schedule<'a> {
    pub(crate) fn day_index(&self, day: NaiveDate) -> Option<usize> {
        self.days.iter().position(|d| d.day == day)
    }

    /// Append an event to the bucket of `event.day`. Returns false when that
    /// day is outside the trip window.
    pub(crate) fn push_event(&mut self, event: ScheduledLeg) -> bool {
        let Some(idx) = self.day_index(event.day) else {
            return false;
        };
        let day = &mut self.days[idx];
        if event.is_drive() {
            day.total_drive_sec += event.duration_sec;
        }
        day.legs.push(event);
        true
    }

    /// Place one leg starting at `depart`, splitting it at every midnight.
    pub(crate) fn schedule_leg(&mut self, depart: NaiveDateTime, leg: &Leg) -> LegOutcome {
        let total_sec = leg.duration_sec;
        let arrive_at = add_seconds(depart, total_sec);

        let mut remaining = total_sec;
        let mut chunk_start = depart;
        let mut chunk_idx = 0usize;

        while remaining > 0 {
            let chunk_end = next_midnight(chunk_start).min(arrive_at);
            if chunk_end <= chunk_start {
                // Clamped at the end of the calendar.
                return LegOutcome {
                    depart_after: chunk_start,
                    arrive_at,
                    spills: true,
                };
            }
            let chunk_sec = seconds_between(chunk_start, chunk_end);
            let is_final = chunk_end == arrive_at;
            let day = chunk_start.date();

            if chunk_idx > 0 && self.scenario.is_rest_day(day) {
                if let Some(idx) = self.day_index(day) {
                    self.days[idx].push_warning(REST_DAY_SPAN_WARNING);
                }
            }

            let chunk = ScheduledLeg {
                from_place_id: leg.from_place_id.clone(),
                to_place_id: leg.to_place_id.clone(),
                duration_sec: chunk_sec,
                distance_meters: apportion_distance(leg.distance_meters, chunk_sec, total_sec),
                depart_at: chunk_start,
                arrive_at: chunk_end,
                day,
                buffer_sec: if is_final { self.buffer_sec } else { 0 },
                kind: leg.kind,
                arrives_at_destination: is_final,
                event_type: EventType::Drive,
                label: None,
                dwell_source: None,
            };

            if !self.push_event(chunk) {
                debug!(%day, from = %leg.from_place_id, to = %leg.to_place_id, "drive falls outside the trip window");
                return LegOutcome {
                    depart_after: chunk_start,
                    arrive_at,
                    spills: true,
                };
            }

            remaining = remaining.saturating_sub(chunk_sec);
            chunk_start = chunk_end;
            chunk_idx += 1;
        }

        LegOutcome {
            depart_after: add_seconds(arrive_at, self.buffer_sec),
            arrive_at,
            spills: false,
        }
    }

    /// Schedule `legs` back to back from a cursor.
    ///
    /// The cursor starts on `start_day_idx` at the daily start time, or at
    /// `start_depart` when given. Rest days are skipped before every
    /// departure.
    fn schedule_legs_forward(
        &mut self,
        start_day_idx: usize,
        start_depart: Option<NaiveDateTime>,
        legs: &[Leg],
        segment: LegKind,
    ) -> ForwardOutcome {
        let trip = self.trip;
        let mut day_idx = start_day_idx.min(self.days.len() - 1);
        let mut depart = start_depart.unwrap_or_else(|| trip.window.day_start(self.days[day_idx].day));
        let mut last_arrival = None;

        for (leg_idx, leg) in legs.iter().enumerate() {
            if !self.ensure_drive_day(&mut day_idx, &mut depart) {
                return ForwardOutcome {
                    end_day_idx: day_idx,
                    end_depart_after: depart,
                    last_arrival,
                    spills: true,
                };
            }

            let outcome = self.schedule_leg(depart, leg);
            if outcome.spills {
                return ForwardOutcome {
                    end_day_idx: day_idx,
                    end_depart_after: depart,
                    last_arrival,
                    spills: true,
                };
            }
            last_arrival = Some(outcome.arrive_at);

            // Reaching home ends the trip; there is no time to spend there.
            let is_terminal = segment == LegKind::Home && leg_idx == legs.len() - 1;
            depart = if is_terminal {
                outcome.depart_after
            } else {
                let dwell_sec = self.insert_arrival_dwells(outcome.arrive_at, &leg.to_place_id);
                add_seconds(outcome.arrive_at, dwell_sec + self.buffer_sec)
            };

            if let Some(next_idx) = self.day_index(depart.date()) {
                day_idx = day_idx.max(next_idx);
            }
        }

        ForwardOutcome {
            end_day_idx: day_idx,
            end_depart_after: depart,
            last_arrival,
            spills: false,
        }
    }

    /// Move the cursor past rest days. False when no driving day is left.
    fn ensure_drive_day(&mut self, day_idx: &mut usize, depart: &mut NaiveDateTime) -> bool {
        while self.scenario.is_rest_day(self.days[*day_idx].day) {
            self.days[*day_idx].push_warning(REST_DAY_WARNING);
            if *day_idx + 1 >= self.days.len() {
                return false;
            }
            *day_idx += 1;
            let next_start = self.trip.window.day_start(self.days[*day_idx].day);
            *depart = (*depart).max(next_start);
        }
        true
    }

    /// Lay down dwell time after arriving at `place_id`. Returns the total
    /// dwell seconds scheduled.
    ///
    /// Declared blocks for that place on the arrival day come first; without
    /// any, a placeholder of [`IMPLICIT_DWELL_SEC`] is inserted.
    fn insert_arrival_dwells(&mut self, arrive_at: NaiveDateTime, place_id: &PlaceId) -> u64 {
        let scenario = self.scenario;
        let trip = self.trip;
        let mut matched = false;
        let mut total_sec = 0;

        for block in scenario.dwell_blocks_on(arrive_at.date()) {
            if block.place_id != *place_id || self.consumed_blocks.contains(&block.id) {
                continue;
            }
            self.consumed_blocks.insert(block.id.clone());
            matched = true;

            let sec = u64::from(block.minutes) * 60;
            if sec == 0 {
                continue;
            }
            let label = block
                .label
                .clone()
                .unwrap_or_else(|| trip.time_at_label(place_id));
            self.push_event(dwell_event(
                place_id,
                add_seconds(arrive_at, total_sec),
                sec,
                label,
                DwellSource::DwellBlock {
                    block_id: block.id.clone(),
                },
            ));
            total_sec += sec;
        }

        if !matched {
            self.push_event(dwell_event(
                place_id,
                arrive_at,
                IMPLICIT_DWELL_SEC,
                trip.time_at_label(place_id),
                DwellSource::ImplicitArrival,
            ));
            total_sec += IMPLICIT_DWELL_SEC;
        }

        total_sec
    }

    /// First day the return could start on: enough whole days before the end
    /// to hold the total return drive, moved earlier off rest days.
    ///
    /// Only consulted when the return departure instant falls outside the
    /// window; otherwise the return starts on that instant's own day.
    fn earliest_return_day_idx(&self, return_legs: &[Leg]) -> usize {
        let last_idx = self.days.len() - 1;
        let total_sec = total_drive_sec(return_legs);
        if total_sec == 0 {
            return last_idx;
        }

        let span_days = usize::try_from(total_sec.div_ceil(SECONDS_PER_DAY))
            .unwrap_or(usize::MAX)
            .max(1);
        let mut idx = self.days.len().saturating_sub(span_days);
        while idx > 0 && self.scenario.is_rest_day(self.days[idx].day) {
            idx -= 1;
        }
        idx
    }

    /// Blocks no arrival claimed are stacked from the day's start time.
    fn lay_down_leftover_blocks(&mut self) {
        let scenario = self.scenario;
        let trip = self.trip;

        for (day, day_override) in &scenario.day_overrides {
            let mut cursor = trip.window.day_start(*day);
            for block in &day_override.dwell_blocks {
                if self.consumed_blocks.contains(&block.id) {
                    continue;
                }
                if !trip.has_place(&block.place_id) {
                    debug!(block = %block.id, place = %block.place_id, "dwell block references an unknown place");
                    continue;
                }
                let sec = u64::from(block.minutes) * 60;
                if sec == 0 {
                    continue;
                }

                let label = block
                    .label
                    .clone()
                    .unwrap_or_else(|| trip.time_at_label(&block.place_id));
                self.push_event(dwell_event(
                    &block.place_id,
                    cursor,
                    sec,
                    label,
                    DwellSource::DwellBlock {
                        block_id: block.id.clone(),
                    },
                ));
                self.consumed_blocks.insert(block.id.clone());
                cursor = add_seconds(cursor, sec);
            }
        }
    }
}

pub(crate) fn dwell_event(
    place_id: &PlaceId,
    start: NaiveDateTime,
    duration_sec: u64,
    label: String,
    source: DwellSource,
) -> ScheduledLeg {
    ScheduledLeg {
        from_place_id: place_id.clone(),
        to_place_id: place_id.clone(),
        duration_sec,
        distance_meters: 0,
        depart_at: start,
        arrive_at: add_seconds(start, duration_sec),
        day: start.date(),
        buffer_sec: 0,
        kind: LegKind::Other,
        arrives_at_destination: true,
        event_type: EventType::Dwell,
        label: Some(label),
        dwell_source: Some(source),
    }
}

fn apportion_distance(distance_meters: u64, chunk_sec: u64, total_sec: u64) -> u64 {
    if total_sec == 0 {
        return 0;
    }
    let fraction = chunk_sec as f64 / total_sec as f64;
    (distance_meters as f64 * fraction).round() as u64
}
