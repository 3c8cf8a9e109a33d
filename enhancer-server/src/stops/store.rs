//! In-memory index of known stops.

use std::collections::{BTreeSet, HashSet};

use geo::Coord;
use rstar::{AABB, RTree, RTreeObject};

use crate::domain::{CandidateStop, Stop};
use crate::enhance::StopLookup;
use crate::geometry::{PathMeasure, bounds_around, distance_m};

use super::error::StopsError;
use super::source::{StopSource, load_sources};

/// Id prefixes of stop sources that only contain carpooling stops.
const CARPOOLING_ID_PREFIXES: [&str; 2] = ["mfdz:", "bbnavi:"];

/// Lower-case name fragments that mark a carpooling stop.
const CARPOOLING_NAME_MARKERS: [&str; 3] = ["mitfahr", "p&m", "p+m"];

/// A stop loaded from a stop source.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownStop {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Maximum distance from a route at which this stop is offered (m).
    pub vicinity_m: f64,
}

impl KnownStop {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    fn to_stop(&self) -> Stop {
        Stop::known(self.id.clone(), self.name.clone(), self.lat, self.lon)
    }
}

/// Whether a stop is designated for carpooling, judged by id and name.
pub fn is_carpooling_stop(id: &str, name: Option<&str>) -> bool {
    if CARPOOLING_ID_PREFIXES.iter().any(|p| id.starts_with(p)) {
        return true;
    }
    name.map(str::to_lowercase)
        .is_some_and(|name| CARPOOLING_NAME_MARKERS.iter().any(|m| name.contains(m)))
}

/// Position of a known stop in the spatial index.
#[derive(Debug, Clone, Copy)]
struct IndexedStop {
    idx: usize,
    /// `[lon, lat]`
    position: [f64; 2],
}

impl RTreeObject for IndexedStop {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

fn envelope((min, max): (Coord<f64>, Coord<f64>)) -> AABB<[f64; 2]> {
    AABB::from_corners([min.x, min.y], [max.x, max.y])
}

/// Known stops, immutable once loaded, with an R-tree over their positions.
///
/// Lookups query the tree with a degree envelope first and measure exact
/// distances only for the stops inside it.
#[derive(Debug, Default)]
pub struct StopsStore {
    stops: Vec<KnownStop>,
    index: RTree<IndexedStop>,
    max_vicinity_m: f64,
}

impl StopsStore {
    pub fn new(stops: Vec<KnownStop>) -> Self {
        let max_vicinity_m = stops.iter().map(|s| s.vicinity_m).fold(0.0, f64::max);
        let index = RTree::bulk_load(
            stops
                .iter()
                .enumerate()
                .map(|(idx, s)| IndexedStop {
                    idx,
                    position: [s.lon, s.lat],
                })
                .collect(),
        );
        Self {
            stops,
            index,
            max_vicinity_m,
        }
    }

    /// Load all sources into a new store.
    pub async fn load(sources: &[StopSource]) -> Result<Self, StopsError> {
        Ok(Self::new(load_sources(sources).await?))
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Indices of stops that may lie within the largest vicinity of `path`,
    /// in load order.
    fn corridor_hits(&self, measure: &PathMeasure) -> BTreeSet<usize> {
        measure
            .segment_bounds(self.max_vicinity_m)
            .into_iter()
            .flat_map(|bounds| self.index.locate_in_envelope(&envelope(bounds)))
            .map(|entry| entry.idx)
            .collect()
    }
}

impl StopLookup for StopsStore {
    fn find_closest_stop(
        &self,
        stop: &Stop,
        max_distance_m: f64,
    ) -> Result<Option<Stop>, StopsError> {
        let target = stop.coord();
        let closest = self
            .index
            .locate_in_envelope(&envelope(bounds_around(target, max_distance_m)))
            .map(|entry| (entry.idx, distance_m(target, self.stops[entry.idx].coord())))
            .filter(|(_, d)| *d <= max_distance_m)
            // Equal distances go to the stop loaded first
            .min_by(|(a, da), (b, db)| da.total_cmp(db).then(a.cmp(b)))
            .map(|(idx, _)| self.stops[idx].to_stop());
        Ok(closest)
    }

    fn find_stops_near(
        &self,
        path: &[Coord<f64>],
        carpool_stops: &[Stop],
    ) -> Result<Vec<CandidateStop>, StopsError> {
        let measure = PathMeasure::new(path);
        let own_ids: HashSet<&str> = carpool_stops
            .iter()
            .filter_map(|s| s.id.as_deref())
            .collect();

        // Own stops first, so they win ties at the route ends
        let mut candidates: Vec<CandidateStop> = carpool_stops
            .iter()
            .filter_map(|stop| {
                let loc = measure.locate(stop.coord())?;
                Some(CandidateStop::new(
                    stop.id.clone(),
                    stop.name.clone(),
                    stop.coord(),
                    loc.along_m,
                ))
            })
            .collect();

        for idx in self.corridor_hits(&measure) {
            let known = &self.stops[idx];
            if own_ids.contains(known.id.as_str()) {
                continue;
            }
            let Some(loc) = measure.locate(known.coord()) else {
                continue;
            };
            if loc.offset_m <= known.vicinity_m {
                candidates.push(CandidateStop::new(
                    Some(known.id.clone()),
                    Some(known.name.clone()),
                    known.coord(),
                    loc.along_m,
                ));
            }
        }

        candidates.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
        Ok(candidates)
    }

    fn is_carpooling_stop(&self, id: &str, name: Option<&str>) -> bool {
        is_carpooling_stop(id, name)
    }
}
