//! Routed paths and the GraphHopper wire format they are read from.

use chrono::Duration;
use geo::Coord;
use serde::{Deserialize, Serialize};

/// One turn-by-turn segment of a routed path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instruction {
    /// Segment length in meters.
    pub distance_m: f64,
    /// Driving time for the segment.
    pub time: Duration,
}

impl Instruction {
    pub fn new(distance_m: f64, time: Duration) -> Self {
        Self { distance_m, time }
    }
}

/// A route through an ordered list of points.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedPath {
    /// Route geometry, `x = lon`, `y = lat`.
    pub points: Vec<Coord<f64>>,
    pub instructions: Vec<Instruction>,
}

impl RoutedPath {
    pub fn total_distance_m(&self) -> f64 {
        self.instructions.iter().map(|i| i.distance_m).sum()
    }

    pub fn total_time(&self) -> Duration {
        self.instructions
            .iter()
            .fold(Duration::zero(), |acc, i| acc + i.time)
    }
}

/// Request body for `POST /route`.
#[derive(Debug, Serialize)]
pub struct RouteRequest<'a> {
    /// `[lon, lat]` pairs.
    pub points: Vec<[f64; 2]>,
    pub profile: &'a str,
    pub instructions: bool,
    pub points_encoded: bool,
    pub calc_points: bool,
    pub locale: &'a str,
}

/// Response of `POST /route`.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteResponse {
    #[serde(default)]
    pub paths: Vec<ResponsePath>,
}

/// Error body returned by GraphHopper with a non-2xx status.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePath {
    /// Total distance in meters.
    pub distance: f64,
    /// Total time in milliseconds.
    pub time: u64,
    pub points: ResponsePoints,
    #[serde(default)]
    pub instructions: Vec<ResponseInstruction>,
}

/// Unencoded GeoJSON LineString.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePoints {
    /// `[lon, lat]` or `[lon, lat, elevation]`.
    pub coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseInstruction {
    /// Meters.
    pub distance: f64,
    /// Milliseconds.
    pub time: u64,
    #[serde(default)]
    pub text: Option<String>,
}

impl From<ResponsePath> for RoutedPath {
    fn from(path: ResponsePath) -> Self {
        let points = path
            .points
            .coordinates
            .iter()
            .filter(|c| c.len() >= 2)
            .map(|c| Coord { x: c[0], y: c[1] })
            .collect();

        let instructions = path
            .instructions
            .iter()
            .map(|i| {
                Instruction::new(
                    i.distance,
                    Duration::milliseconds(i64::try_from(i.time).unwrap_or(i64::MAX)),
                )
            })
            .collect();

        RoutedPath {
            points,
            instructions,
        }
    }
}
