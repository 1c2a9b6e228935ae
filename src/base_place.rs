//! Where the traveler is at the start of each day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{DayItinerary, PlaceId, Scenario};

/// Replay arrivals in order, starting at the scenario's physical start.
///
/// Every event that arrives (dwells and final drive chunks) moves the
/// traveler; chunks that stop at midnight do not.
pub fn compute_base_place_by_day(days: &[DayItinerary], scenario: &Scenario) -> BTreeMap<NaiveDate, Option<PlaceId>> {
    let start = Some(&scenario.actual_start_place_id)
        .filter(|id| !id.is_empty())
        .or(Some(&scenario.selected_origin_place_id))
        .filter(|id| !id.is_empty());
    let mut current: Option<&PlaceId> = start;
    let mut by_day = BTreeMap::new();

    for day in days {
        by_day.insert(day.day, current.cloned());
        for event in day.legs.iter().filter(|event| event.arrives_at_destination) {
            current = Some(&event.to_place_id);
        }
    }

    by_day
}
