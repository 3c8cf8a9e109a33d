//! Domain types for carpool enhancement.
//!
//! Carpool offers as agencies publish them, the stop times produced for trip
//! planners, and the service-day time type both are expressed in.

mod carpool;
mod stop_time;
mod time;

pub use carpool::{Carpool, EnhancedCarpool, PathGeometry, PickupDropoff, Stop};
pub use stop_time::{CandidateStop, StopTime};
pub use time::{GtfsTime, TimeError, departure_time, parse_departure_time};
