//! Arrival time estimation along a routed path.
//!
//! The router reports distance and time per turn-by-turn segment. A point at
//! a given distance along the route is reached after the time of all
//! completed segments plus the proportional share of the segment it lies in.

use chrono::Duration;
use tracing::debug;

use crate::routing::RoutedPath;

/// A point falls on a route segment of zero length, so no time can be
/// interpolated for it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("origin and destination too close: zero-length segment {instruction} at {distance_m:.1} m")]
pub struct DegenerateSegment {
    /// Index of the offending instruction.
    pub instruction: usize,
    /// Distance along the route that was being estimated.
    pub distance_m: f64,
}

/// Estimate driving time from the path start to each distance.
///
/// `distances` must be sorted ascending; the instruction cursor only moves
/// forward. Distances past the end of the route get the route's total time.
pub fn estimate_elapsed(
    path: &RoutedPath,
    distances: &[f64],
) -> Result<Vec<Duration>, DegenerateSegment> {
    let instructions = &path.instructions;

    let mut cursor = 0;
    let mut cumulated_distance = 0.0;
    let mut cumulated_ms = 0.0;
    let mut elapsed = Vec::with_capacity(distances.len());

    for &target in distances {
        while cursor < instructions.len()
            && cumulated_distance + instructions[cursor].distance_m < target
        {
            cumulated_distance += instructions[cursor].distance_m;
            cumulated_ms += millis(instructions[cursor].time);
            cursor += 1;
        }

        match instructions.get(cursor) {
            Some(instruction) if instruction.distance_m == 0.0 => {
                return Err(DegenerateSegment {
                    instruction: cursor,
                    distance_m: target,
                });
            }
            Some(instruction) => {
                let fraction = (target - cumulated_distance) / instruction.distance_m;
                let ms = cumulated_ms + fraction * millis(instruction.time);
                elapsed.push(Duration::milliseconds(ms.round() as i64));
            }
            None => {
                debug!(
                    distance_m = target,
                    total_m = cumulated_distance,
                    "distance exceeds route length, using arrival time"
                );
                elapsed.push(Duration::milliseconds(cumulated_ms.round() as i64));
            }
        }
    }

    Ok(elapsed)
}

fn millis(d: Duration) -> f64 {
    d.num_milliseconds() as f64
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::routing::Instruction;
    use proptest::prelude::*;

    prop_compose! {
        fn routed_path()(
            segments in prop::collection::vec((1.0f64..5000.0, 0i64..600_000), 1..20)
        ) -> RoutedPath {
            RoutedPath {
                points: Vec::new(),
                instructions: segments
                    .into_iter()
                    .map(|(d, ms)| Instruction::new(d, Duration::milliseconds(ms)))
                    .collect(),
            }
        }
    }

    proptest! {
        /// Later points along the route are never reached earlier
        #[test]
        fn elapsed_is_monotonic(
            path in routed_path(),
            fractions in prop::collection::vec(0.0f64..1.2, 1..30),
        ) {
            let total = path.total_distance_m();
            let mut distances: Vec<f64> = fractions.iter().map(|f| f * total).collect();
            distances.sort_by(|a, b| a.total_cmp(b));

            let elapsed = estimate_elapsed(&path, &distances).unwrap();
            prop_assert_eq!(elapsed.len(), distances.len());
            for pair in elapsed.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }

        /// No estimate exceeds the route's total time
        #[test]
        fn elapsed_bounded_by_total(
            path in routed_path(),
            fractions in prop::collection::vec(0.0f64..2.0, 1..30),
        ) {
            let total = path.total_distance_m();
            let mut distances: Vec<f64> = fractions.iter().map(|f| f * total).collect();
            distances.sort_by(|a, b| a.total_cmp(b));

            let elapsed = estimate_elapsed(&path, &distances).unwrap();
            let total_time = path.total_time();
            for e in elapsed {
                prop_assert!(e <= total_time);
                prop_assert!(e >= Duration::zero());
            }
        }
    }
}
