//! Routing engine client.
//!
//! Carpool paths come from a GraphHopper server. A request lists the carpool's
//! stops in order; the answer carries the road geometry plus turn-by-turn
//! instructions with per-segment distance (m) and time (ms), which is what
//! arrival times along the route are interpolated from.

mod client;
mod error;
mod types;

pub use client::{GraphHopperClient, GraphHopperConfig};
pub use error::RoutingError;
pub use types::{Instruction, RoutedPath};
