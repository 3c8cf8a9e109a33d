//! Carpool trip enhancer.
//!
//! Turns a sparse carpool offer (origin, destination, a departure time) into
//! a dense, timed trip: every known stop the driver passes becomes a
//! boarding or alighting opportunity, so transit-style trip planners can
//! offer the ride like a bus line.

pub mod cache;
pub mod domain;
pub mod enhance;
pub mod geometry;
pub mod routing;
pub mod stops;
pub mod web;
