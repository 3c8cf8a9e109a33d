//! Trip enhancement.
//!
//! Converts a carpool offer (origin, optional via stops, destination and a
//! departure time) into a schedule-like sequence of stop times: every known
//! stop along the driven route becomes a boarding or alighting opportunity,
//! timed by interpolating the router's turn-by-turn instructions.

mod config;
mod error;
mod estimate;
mod select;
mod transform;

pub use config::{EnhancerConfig, MAX_STOPS_PER_TRIP};
pub use error::EnhanceError;
pub use estimate::{DegenerateSegment, estimate_elapsed};
pub use select::build_stop_times;
pub use transform::{PathProvider, StopLookup, TripTransformer, cap_stops};
