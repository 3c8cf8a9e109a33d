//! The trip enhancement pipeline.
//!
//! For one carpool: snap its stops to known stops, route through them,
//! simplify the route, collect further stops along it, time every stop from
//! the router's instructions, cap the stop count and emit stop times.

use std::future::Future;

use geo::Coord;
use tracing::{debug, info};

use crate::domain::{CandidateStop, Carpool, EnhancedCarpool, PathGeometry, Stop};
use crate::geometry::{points_from_stops, simplify};
use crate::routing::{RoutedPath, RoutingError};
use crate::stops::StopsError;

use super::config::EnhancerConfig;
use super::error::EnhanceError;
use super::estimate::estimate_elapsed;
use super::select::build_stop_times;

/// Lookup of known stops.
///
/// Implementations are shared between concurrent enhancements and must be
/// safe for concurrent reads.
pub trait StopLookup {
    /// The known stop closest to `stop`, if one lies within `max_distance_m`.
    fn find_closest_stop(
        &self,
        stop: &Stop,
        max_distance_m: f64,
    ) -> Result<Option<Stop>, StopsError>;

    /// Stops along `path`, merged with the carpool's own stops.
    ///
    /// Known stops already among `carpool_stops` are not repeated. Every
    /// candidate carries its distance along `path`; the result is sorted by
    /// that distance.
    fn find_stops_near(
        &self,
        path: &[Coord<f64>],
        carpool_stops: &[Stop],
    ) -> Result<Vec<CandidateStop>, StopsError>;

    /// Whether a stop is designated for carpooling.
    fn is_carpooling_stop(&self, id: &str, name: Option<&str>) -> bool;
}

/// Source of routed paths.
///
/// This abstraction allows the pipeline to be tested without a router.
pub trait PathProvider {
    /// Route through `points` in the given order.
    fn path_for_points(
        &self,
        points: &[Coord<f64>],
    ) -> impl Future<Output = Result<RoutedPath, RoutingError>> + Send;
}

/// Turns sparse carpool offers into dense, timed trips.
pub struct TripTransformer<S, P> {
    stops: S,
    router: P,
    config: EnhancerConfig,
}

impl<S: StopLookup, P: PathProvider> TripTransformer<S, P> {
    /// Create a new transformer.
    pub fn new(stops: S, router: P, config: EnhancerConfig) -> Self {
        Self {
            stops,
            router,
            config,
        }
    }

    /// Enhance a carpool. The input is left untouched.
    pub async fn enhance(&self, carpool: &Carpool) -> Result<EnhancedCarpool, EnhanceError> {
        let stops = if self.config.replace_stops_by_closest {
            self.snap_stops(&carpool.stops)?
        } else {
            carpool.stops.clone()
        };

        let path = self
            .router
            .path_for_points(&points_from_stops(&stops))
            .await?;
        if path.points.len() < 2 || path.total_distance_m() <= 0.0 {
            return Err(RoutingError::DegeneratePath.into());
        }

        let simplified = simplify(&path.points, self.config.simplify_tolerance);

        let mut candidates = self.stops.find_stops_near(&simplified, &stops)?;
        if !candidates.is_empty() {
            // Timing uses the router's own segments, not the simplified shape
            let distances: Vec<f64> = candidates.iter().map(|c| c.distance_m).collect();
            let elapsed = estimate_elapsed(&path, &distances)?;
            for (candidate, elapsed) in candidates.iter_mut().zip(elapsed) {
                candidate.elapsed = elapsed;
            }
            debug!(
                trip = %carpool.trip_id(),
                count = candidates.len(),
                "virtual stops found"
            );
        }

        let candidates = cap_stops(candidates, self.config.max_stops_per_trip);

        let stop_times = build_stop_times(
            carpool.departure_time,
            &candidates,
            &self.config,
            |id, name| self.stops.is_carpooling_stop(id, name),
        );
        if stop_times.len() < 2 {
            return Err(EnhanceError::InsufficientStops {
                count: stop_times.len(),
            });
        }

        info!(
            trip = %carpool.trip_id(),
            stops = stop_times.len(),
            path_points = simplified.len(),
            "enhanced carpool"
        );

        Ok(EnhancedCarpool::from_carpool(
            carpool,
            stop_times,
            PathGeometry::from_coords(&simplified),
        ))
    }

    /// Replace each stop by the closest known stop within the search radius.
    ///
    /// Boarding permissions and times declared on the carpool's stop are kept.
    fn snap_stops(&self, stops: &[Stop]) -> Result<Vec<Stop>, StopsError> {
        stops
            .iter()
            .map(|stop| {
                let closest = self
                    .stops
                    .find_closest_stop(stop, self.config.stop_search_radius_m)?;
                Ok(match closest {
                    Some(known) => {
                        debug!(stop = ?known.id, "snapped carpool stop");
                        Stop {
                            pickup_dropoff: stop.pickup_dropoff,
                            arrival_time: stop.arrival_time,
                            departure_time: stop.departure_time,
                            ..known
                        }
                    }
                    None => stop.clone(),
                })
            })
            .collect()
    }
}

/// Keep at most `max` items: the head and tail of the sequence, dropping the
/// interior.
///
/// The head gets the extra item when `max` is odd, so the first and last
/// items always survive for `max >= 2`.
pub fn cap_stops<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    if items.len() <= max {
        return items;
    }
    let tail = max / 2;
    let head = max - tail;
    let tail_start = items.len() - tail;
    items.drain(head..tail_start);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_keeps_short_sequences() {
        let items: Vec<u32> = (0..5).collect();
        assert_eq!(cap_stops(items.clone(), 5), items);
        assert_eq!(cap_stops(items.clone(), 100), items);
    }

    #[test]
    fn cap_keeps_head_and_tail() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(cap_stops(items, 4), vec![0, 1, 8, 9]);
    }

    #[test]
    fn cap_odd_max_favours_head() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(cap_stops(items, 5), vec![0, 1, 2, 8, 9]);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Capping keeps exactly the first max - max/2 and last max/2 items
        #[test]
        fn cap_keeps_first_and_last(len in 0usize..300, max in 2usize..120) {
            let items: Vec<usize> = (0..len).collect();
            let capped = cap_stops(items, max);

            if len <= max {
                prop_assert_eq!(capped.len(), len);
            } else {
                let tail = max / 2;
                let head = max - tail;
                let expected: Vec<usize> = (0..head).chain(len - tail..len).collect();
                prop_assert_eq!(capped.len(), max);
                prop_assert_eq!(capped, expected);
            }
        }

        /// Order is preserved and both ends survive
        #[test]
        fn cap_preserves_order(len in 2usize..300, max in 2usize..120) {
            let items: Vec<usize> = (0..len).collect();
            let capped = cap_stops(items, max);

            prop_assert_eq!(capped.first(), Some(&0));
            prop_assert_eq!(capped.last(), Some(&(len - 1)));
            for pair in capped.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod transform_tests;
