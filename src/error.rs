//! Crate error type.
//!
//! Only the boundaries fail: parsing, normalization and routing. The
//! scheduler itself reports infeasibility through its return value.

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("invalid time of day `{0}`, expected HH:MM")]
    InvalidTime(String),

    #[error("trip ends on {end} which is before its start on {start}")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },

    #[error("unknown scenario `{0}`")]
    UnknownScenario(String),

    #[error("trip has no scenarios")]
    NoScenarios,

    #[error("unsupported trip document version {0}")]
    UnsupportedVersion(u32),

    #[error("invalid trip document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("routing request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("routing service responded with `{0}`")]
    Routing(String),

    #[error("routing service returned {actual} legs for {expected} waypoint pairs")]
    LegCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
