//! Geometry helpers for routed paths.
//!
//! Coordinates are `geo::Coord` with `x = lon`, `y = lat` (WGS84 degrees).
//! Great-circle distances use the haversine formula; positions along a path
//! use a local equirectangular projection, which is accurate to well below a
//! meter at carpool scale.

use geo::{Coord, Distance, Haversine, LineString, Point, Simplify};

use crate::domain::{Carpool, Stop};

/// Mean earth radius in meters, as used by `geo`'s haversine.
const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Douglas–Peucker simplification with `tolerance` in coordinate units.
///
/// The first and last points are always kept. Simplifying an already
/// simplified path with the same tolerance returns it unchanged.
pub fn simplify(coords: &[Coord<f64>], tolerance: f64) -> Vec<Coord<f64>> {
    if coords.len() < 3 {
        return coords.to_vec();
    }
    let line = LineString::from(coords.to_vec());
    line.simplify(&tolerance).0
}

/// Great-circle distance between two coordinates in meters.
pub fn distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine::distance(Point::from(a), Point::from(b))
}

/// Coordinates of the given stops, in order.
pub fn points_from_stops(stops: &[Stop]) -> Vec<Coord<f64>> {
    stops.iter().map(Stop::coord).collect()
}

/// Straight-line distance between a carpool's first and last stop.
///
/// Returns 0 for carpools with fewer than two stops.
pub fn carpool_span_m(carpool: &Carpool) -> f64 {
    match (carpool.stops.first(), carpool.stops.last()) {
        (Some(first), Some(last)) if carpool.stops.len() >= 2 => {
            distance_m(first.coord(), last.coord())
        }
        _ => 0.0,
    }
}

/// Box of `radius_m` meters around `center` in degrees, as `(min, max)`.
pub fn bounds_around(center: Coord<f64>, radius_m: f64) -> (Coord<f64>, Coord<f64>) {
    let dlat = (radius_m / EARTH_RADIUS_M).to_degrees();
    let dlon = dlat / center.y.to_radians().cos().max(1e-6);
    (
        Coord {
            x: center.x - dlon,
            y: center.y - dlat,
        },
        Coord {
            x: center.x + dlon,
            y: center.y + dlat,
        },
    )
}

/// Where a point lies relative to a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathLocation {
    /// Distance from the point to the nearest position on the path (m).
    pub offset_m: f64,
    /// Distance along the path from its start to that position (m).
    pub along_m: f64,
}

/// A path prepared for repeated point lookups.
#[derive(Debug, Clone)]
pub struct PathMeasure {
    /// Projected vertices in meters.
    points: Vec<(f64, f64)>,
    /// Cumulative length at each vertex.
    cumulative: Vec<f64>,
    cos_ref: f64,
}

impl PathMeasure {
    pub fn new(coords: &[Coord<f64>]) -> Self {
        let ref_lat = if coords.is_empty() {
            0.0
        } else {
            coords.iter().map(|c| c.y).sum::<f64>() / coords.len() as f64
        };
        let cos_ref = ref_lat.to_radians().cos();

        let points: Vec<(f64, f64)> = coords.iter().map(|c| project(*c, cos_ref)).collect();

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                total += planar_distance(points[i - 1], *p);
            }
            cumulative.push(total);
        }

        Self {
            points,
            cumulative,
            cos_ref,
        }
    }

    /// Total path length in meters.
    pub fn length_m(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Locate a coordinate on the path. `None` for an empty path.
    ///
    /// When several segments are equally close, the earliest one wins.
    pub fn locate(&self, coord: Coord<f64>) -> Option<PathLocation> {
        let p = project(coord, self.cos_ref);

        match self.points.len() {
            0 => None,
            1 => Some(PathLocation {
                offset_m: planar_distance(self.points[0], p),
                along_m: 0.0,
            }),
            _ => {
                let mut best: Option<PathLocation> = None;
                for (i, seg) in self.points.windows(2).enumerate() {
                    let (offset_m, t) = project_onto_segment(p, seg[0], seg[1]);
                    let seg_len = self.cumulative[i + 1] - self.cumulative[i];
                    let candidate = PathLocation {
                        offset_m,
                        along_m: self.cumulative[i] + t * seg_len,
                    };
                    if best.is_none_or(|b| candidate.offset_m < b.offset_m) {
                        best = Some(candidate);
                    }
                }
                best
            }
        }
    }

    /// Bounding box of every segment in degrees, widened by `margin_m`
    /// meters, as `(min, max)` coordinates.
    ///
    /// A single-vertex path yields one box around that vertex.
    pub fn segment_bounds(&self, margin_m: f64) -> Vec<(Coord<f64>, Coord<f64>)> {
        let boxes = |a: (f64, f64), b: (f64, f64)| {
            let min = (a.0.min(b.0) - margin_m, a.1.min(b.1) - margin_m);
            let max = (a.0.max(b.0) + margin_m, a.1.max(b.1) + margin_m);
            (unproject(min, self.cos_ref), unproject(max, self.cos_ref))
        };

        match self.points.as_slice() {
            [] => Vec::new(),
            [only] => vec![boxes(*only, *only)],
            points => points.windows(2).map(|seg| boxes(seg[0], seg[1])).collect(),
        }
    }
}

fn project(c: Coord<f64>, cos_ref: f64) -> (f64, f64) {
    (
        c.x.to_radians() * cos_ref * EARTH_RADIUS_M,
        c.y.to_radians() * EARTH_RADIUS_M,
    )
}

fn unproject(p: (f64, f64), cos_ref: f64) -> Coord<f64> {
    Coord {
        x: (p.0 / (cos_ref * EARTH_RADIUS_M)).to_degrees(),
        y: (p.1 / EARTH_RADIUS_M).to_degrees(),
    }
}

fn planar_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt()
}

/// Distance from `p` to segment `a`-`b` and the clamped fraction along it.
fn project_onto_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> (f64, f64) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (planar_distance(a, p), 0.0);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    let foot = (a.0 + t * dx, a.1 + t * dy);
    (planar_distance(foot, p), t)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn coord()(x in 8.0f64..9.0, y in 48.0f64..49.0) -> Coord<f64> {
            Coord { x, y }
        }
    }

    proptest! {
        /// Simplifying twice changes nothing
        #[test]
        fn simplify_is_idempotent(
            line in prop::collection::vec(coord(), 0..40),
            tolerance in 0.00001f64..0.05,
        ) {
            let once = simplify(&line, tolerance);
            let twice = simplify(&once, tolerance);
            prop_assert_eq!(once, twice);
        }

        /// Endpoints always survive
        #[test]
        fn simplify_keeps_endpoints(
            line in prop::collection::vec(coord(), 2..40),
            tolerance in 0.00001f64..0.05,
        ) {
            let simplified = simplify(&line, tolerance);
            prop_assert_eq!(simplified.first(), line.first());
            prop_assert_eq!(simplified.last(), line.last());
        }

        /// Every vertex locates within the path's length
        #[test]
        fn vertices_locate_within_length(line in prop::collection::vec(coord(), 2..20)) {
            let measure = PathMeasure::new(&line);
            let length = measure.length_m();
            for c in &line {
                let loc = measure.locate(*c).unwrap();
                prop_assert!(loc.along_m >= 0.0);
                prop_assert!(loc.along_m <= length + 1e-6);
            }
        }
    }
}
