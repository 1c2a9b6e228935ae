//! Defaults applied at the normalization boundary.

use chrono::NaiveTime;

#[derive(Debug, Clone)]
pub struct TripDefaults {
    /// Daily start time when a stored trip has none.
    pub start_time: NaiveTime,
    /// Arrival cutoff on the last day when a stored trip has none.
    pub end_time: NaiveTime,
    pub buffer_minutes: u32,
    /// Dwell given to day trips migrated from the legacy preset field.
    pub legacy_day_trip_dwell_minutes: u32,
}

impl Default for TripDefaults {
    fn default() -> Self {
        Self {
            start_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
            buffer_minutes: 20,
            legacy_day_trip_dwell_minutes: 120,
        }
    }
}
