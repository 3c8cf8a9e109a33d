//! Web layer for the trip enhancer.
//!
//! Accepts carpool offers over HTTP and answers with the enhanced trip.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, MIN_TRIP_SPAN_M, create_router};
pub use state::{AppState, Transformer};
