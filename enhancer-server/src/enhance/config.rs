//! Tuning parameters for trip enhancement.

use chrono::Duration;

/// Maximum number of stop times published per trip.
pub const MAX_STOPS_PER_TRIP: usize = 100;

/// Configuration parameters for the enhancement pipeline.
#[derive(Debug, Clone)]
pub struct EnhancerConfig {
    /// Replace carpool stops by the closest known stop before routing.
    pub replace_stops_by_closest: bool,

    /// Search radius for the closest known stop (meters).
    pub stop_search_radius_m: f64,

    /// Douglas–Peucker tolerance for the stored path (degrees).
    pub simplify_tolerance: f64,

    /// Upper bound on published stops per trip.
    pub max_stops_per_trip: usize,

    /// The origin is dropped when the next stop is reached faster than this.
    pub origin_merge_gap: Duration,

    /// A stop reached faster than this after its predecessor is dropped,
    /// unless it is a designated carpooling stop.
    pub min_stop_gap: Duration,
}

impl EnhancerConfig {
    /// Set the closest-stop search radius.
    pub fn with_stop_search_radius(mut self, meters: f64) -> Self {
        self.stop_search_radius_m = meters;
        self
    }

    /// Set the path simplification tolerance.
    pub fn with_simplify_tolerance(mut self, tolerance: f64) -> Self {
        self.simplify_tolerance = tolerance;
        self
    }

    /// Set the maximum number of stops per trip.
    pub fn with_max_stops(mut self, max: usize) -> Self {
        self.max_stops_per_trip = max;
        self
    }

    /// Keep the carpool's own coordinates instead of snapping them.
    pub fn without_stop_replacement(mut self) -> Self {
        self.replace_stops_by_closest = false;
        self
    }
}

impl Default for EnhancerConfig {
    fn default() -> Self {
        Self {
            replace_stops_by_closest: true,
            stop_search_radius_m: 1000.0,
            simplify_tolerance: 0.0001,
            max_stops_per_trip: MAX_STOPS_PER_TRIP,
            origin_merge_gap: Duration::seconds(1),
            min_stop_gap: Duration::seconds(5),
        }
    }
}
