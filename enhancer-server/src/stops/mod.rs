//! Known transit and carpooling stops.
//!
//! Stops are loaded at startup from configured sources and answer the
//! pipeline's two spatial questions: which known stop replaces a carpool's
//! free-form coordinate, and which stops lie along a routed path.

mod error;
mod source;
mod store;

pub use error::StopsError;
pub use source::{
    SourceFormat, StopSource, load_sources, parse_geojson_stops, parse_stops, read_stop_sources,
};
pub use store::{KnownStop, StopsStore, is_carpooling_stop};
