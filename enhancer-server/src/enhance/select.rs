//! Turning route candidates into published stop times.
//!
//! Candidates arrive ordered by distance along the route, origin first and
//! destination last. Only matched stops are published. Stops reached within
//! a few seconds of their predecessor add nothing for riders and are merged
//! away, except designated carpooling stops, which are always kept.

use chrono::{Duration, NaiveTime};
use tracing::debug;

use crate::domain::{CandidateStop, GtfsTime, PickupDropoff, StopTime};

use super::config::EnhancerConfig;

/// Build the stop times for a trip departing at `departure`.
///
/// `is_carpooling_stop` is asked (with id and name) whether a stop is a
/// designated carpooling stop that must not be merged into its predecessor.
/// The result may hold fewer than two entries; callers decide whether that
/// is acceptable.
pub fn build_stop_times(
    departure: NaiveTime,
    candidates: &[CandidateStop],
    config: &EnhancerConfig,
    is_carpooling_stop: impl Fn(&str, Option<&str>) -> bool,
) -> Vec<StopTime> {
    let Some(last) = candidates.last() else {
        return Vec::new();
    };
    let midpoint = 0.5 * last.distance_m;

    let mut kept: Vec<(&str, &CandidateStop)> = Vec::new();

    for (i, current) in candidates.iter().enumerate() {
        let Some(id) = current.id.as_deref() else {
            continue;
        };

        if i == 0 {
            // An official stop right after the origin replaces it
            if let Some(next) = candidates.get(1) {
                if next.elapsed - current.elapsed < config.origin_merge_gap {
                    debug!(stop = id, "skipped origin close to next stop");
                    continue;
                }
            }
        } else {
            let previous = &candidates[i - 1];
            let too_close = current.elapsed - previous.elapsed < config.min_stop_gap;
            if too_close
                && i != 1
                && previous.is_matched()
                && !is_carpooling_stop(id, current.name.as_deref())
            {
                debug!(stop = id, "skipped stop close to preceding stop");
                continue;
            }
        }

        kept.push((id, current));
    }

    let start = GtfsTime::from_time_of_day(departure);
    let base = kept
        .first()
        .map(|(_, c)| c.elapsed)
        .unwrap_or_else(Duration::zero);

    kept.into_iter()
        .enumerate()
        .map(|(seq, (id, c))| {
            let time = start + (c.elapsed - base);
            StopTime {
                id: id.to_string(),
                name: c.name.clone().unwrap_or_else(|| id.to_string()),
                lat: c.lat,
                lon: c.lon,
                arrival_time: time,
                departure_time: time,
                pickup_dropoff: classify(c.distance_m, midpoint),
                sequence: seq as u32 + 1,
            }
        })
        .collect()
}

/// Riders board in the first half of the route and leave in the second.
fn classify(distance_m: f64, midpoint: f64) -> PickupDropoff {
    if distance_m < midpoint {
        PickupDropoff::OnlyPickup
    } else {
        PickupDropoff::OnlyDropoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn departure() -> NaiveTime {
        NaiveTime::from_hms_opt(8, 0, 0).unwrap()
    }

    fn candidate(id: Option<&str>, distance_m: f64, elapsed_secs: i64) -> CandidateStop {
        let mut c = CandidateStop::new(
            id.map(str::to_string),
            id.map(|s| format!("Stop {s}")),
            Coord {
                x: 9.0 + distance_m / 100_000.0,
                y: 48.0,
            },
            distance_m,
        );
        c.elapsed = Duration::seconds(elapsed_secs);
        c
    }

    fn never(_: &str, _: Option<&str>) -> bool {
        false
    }

    fn ids(stop_times: &[StopTime]) -> Vec<&str> {
        stop_times.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn two_distant_stops_are_kept() {
        let candidates = vec![candidate(Some("a"), 0.0, 0), candidate(Some("b"), 15_000.0, 900)];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);

        assert_eq!(ids(&result), vec!["a", "b"]);
        assert_eq!(result[0].pickup_dropoff, PickupDropoff::OnlyPickup);
        assert_eq!(result[1].pickup_dropoff, PickupDropoff::OnlyDropoff);
        assert_eq!(result[0].arrival_time.to_string(), "08:00:00");
        assert_eq!(result[1].arrival_time.to_string(), "08:15:00");
        assert_eq!(result[1].arrival_time, result[1].departure_time);
        assert_eq!(result[0].sequence, 1);
        assert_eq!(result[1].sequence, 2);
    }

    #[test]
    fn origin_merged_into_close_successor() {
        let candidates = vec![
            candidate(Some("origin"), 0.0, 0),
            candidate(Some("near"), 5.0, 0),
            candidate(Some("dest"), 20_000.0, 1200),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);

        assert_eq!(ids(&result), vec!["near", "dest"]);
        assert_eq!(result[0].sequence, 1);
        assert_eq!(result[1].sequence, 2);
        // The first published stop departs at the declared time
        assert_eq!(result[0].arrival_time.to_string(), "08:00:00");
    }

    #[test]
    fn first_published_stop_is_rebased_to_departure() {
        let candidates = vec![
            candidate(None, 0.0, 0),
            candidate(Some("first"), 3000.0, 180),
            candidate(Some("dest"), 20_000.0, 1200),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);

        assert_eq!(ids(&result), vec!["first", "dest"]);
        assert_eq!(result[0].arrival_time.to_string(), "08:00:00");
        assert_eq!(result[1].arrival_time.to_string(), "08:17:00");
    }

    #[test]
    fn unmatched_candidates_are_dropped() {
        let candidates = vec![
            candidate(Some("a"), 0.0, 0),
            candidate(None, 8000.0, 400),
            candidate(Some("b"), 16_000.0, 800),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);
        assert_eq!(ids(&result), vec!["a", "b"]);
    }

    #[test]
    fn close_stop_after_matched_predecessor_is_dropped() {
        let candidates = vec![
            candidate(Some("a"), 0.0, 0),
            candidate(Some("b"), 5000.0, 300),
            candidate(Some("c"), 5050.0, 303),
            candidate(Some("d"), 16_000.0, 800),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);
        assert_eq!(ids(&result), vec!["a", "b", "d"]);
        assert_eq!(result[2].sequence, 3);
    }

    #[test]
    fn second_candidate_is_never_merged() {
        let candidates = vec![
            candidate(Some("a"), 0.0, 0),
            candidate(Some("b"), 30.0, 2),
            candidate(Some("c"), 16_000.0, 800),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);
        assert_eq!(ids(&result), vec!["a", "b", "c"]);
    }

    #[test]
    fn carpooling_stop_is_never_merged() {
        let candidates = vec![
            candidate(Some("a"), 0.0, 0),
            candidate(Some("b"), 5000.0, 300),
            candidate(Some("mfdz:parking"), 5050.0, 303),
            candidate(Some("d"), 16_000.0, 800),
        ];
        let result = build_stop_times(
            departure(),
            &candidates,
            &EnhancerConfig::default(),
            |id, _| id.starts_with("mfdz:"),
        );
        assert_eq!(ids(&result), vec!["a", "b", "mfdz:parking", "d"]);
    }

    #[test]
    fn unmatched_predecessor_never_suppresses() {
        let candidates = vec![
            candidate(Some("a"), 0.0, 0),
            candidate(Some("b"), 5000.0, 300),
            candidate(None, 5040.0, 302),
            candidate(Some("c"), 5050.0, 303),
            candidate(Some("d"), 16_000.0, 800),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);
        assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn midpoint_belongs_to_dropoff() {
        let candidates = vec![
            candidate(Some("a"), 0.0, 0),
            candidate(Some("mid"), 5000.0, 300),
            candidate(Some("b"), 10_000.0, 600),
        ];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);
        assert_eq!(result[1].pickup_dropoff, PickupDropoff::OnlyDropoff);
    }

    #[test]
    fn trip_past_midnight_keeps_counting() {
        let late = NaiveTime::from_hms_opt(23, 50, 0).unwrap();
        let candidates = vec![candidate(Some("a"), 0.0, 0), candidate(Some("b"), 30_000.0, 1800)];
        let result = build_stop_times(late, &candidates, &EnhancerConfig::default(), never);
        assert_eq!(result[1].arrival_time.to_string(), "24:20:00");
    }

    #[test]
    fn names_fall_back_to_id() {
        let mut unnamed = candidate(Some("b"), 15_000.0, 900);
        unnamed.name = None;
        let candidates = vec![candidate(Some("a"), 0.0, 0), unnamed];
        let result = build_stop_times(departure(), &candidates, &EnhancerConfig::default(), never);
        assert_eq!(result[0].name, "Stop a");
        assert_eq!(result[1].name, "b");
    }

    #[test]
    fn empty_and_single_inputs() {
        let config = EnhancerConfig::default();
        assert!(build_stop_times(departure(), &[], &config, never).is_empty());

        let single = vec![candidate(Some("a"), 0.0, 0)];
        let result = build_stop_times(departure(), &single, &config, never);
        assert_eq!(ids(&result), vec!["a"]);
    }
}
