//! roadtrip-planner core
//!
//! Turns a multi-stop road trip (places, ordered stops, per-day overrides)
//! into a day-by-day driving itinerary that respects the trip window.

pub mod base_place;
pub mod cache;
pub mod calendar;
pub mod config;
pub mod day_trip;
pub mod error;
pub mod haversine;
pub mod legs;
pub mod model;
pub mod normalize;
pub mod osrm;
pub mod planner;
pub mod scheduler;
pub mod traits;

pub use error::{Error, Result};
