//! Carpool offers as published by agencies.

use chrono::{NaiveDate, NaiveTime};
use geo::Coord;
use serde::{Deserialize, Serialize};

use super::stop_time::StopTime;
use super::time::{GtfsTime, departure_time};

/// Which boarding actions a stop offers to riders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupDropoff {
    OnlyPickup,
    OnlyDropoff,
    #[default]
    PickupAndDropoff,
}

impl PickupDropoff {
    pub fn allows_pickup(&self) -> bool {
        !matches!(self, PickupDropoff::OnlyDropoff)
    }

    pub fn allows_dropoff(&self) -> bool {
        !matches!(self, PickupDropoff::OnlyPickup)
    }
}

/// A stop of a carpool offer.
///
/// Stops supplied by agencies may be free-form coordinates without an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub lat: f64,
    pub lon: f64,

    #[serde(default, rename = "pickup_dropoff")]
    pub pickup_dropoff: PickupDropoff,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<GtfsTime>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<GtfsTime>,
}

impl Stop {
    /// A free-form stop at the given coordinate.
    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            id: None,
            name: None,
            lat,
            lon,
            pickup_dropoff: PickupDropoff::default(),
            arrival_time: None,
            departure_time: None,
        }
    }

    /// A known stop with id and name.
    pub fn known(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
            ..Self::at(lat, lon)
        }
    }

    /// Position as an x/y (lon/lat) coordinate.
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

/// GeoJSON LineString geometry of a carpool's route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "LineString")]
pub struct PathGeometry {
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

impl PathGeometry {
    pub fn from_coords(coords: &[Coord<f64>]) -> Self {
        Self {
            coordinates: coords.iter().map(|c| [c.x, c.y]).collect(),
        }
    }

    pub fn coords(&self) -> Vec<Coord<f64>> {
        self.coordinates
            .iter()
            .map(|[x, y]| Coord { x: *x, y: *y })
            .collect()
    }
}

/// A carpool offer as received from an agency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Carpool {
    pub id: String,
    pub agency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,

    pub stops: Vec<Stop>,

    #[serde(with = "departure_time")]
    pub departure_time: NaiveTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathGeometry>,
}

impl Carpool {
    /// Trip id as used in published feeds: `agency:id`.
    pub fn trip_id(&self) -> String {
        format!("{}:{}", self.agency, self.id)
    }
}

/// A carpool with dense stop times and a route geometry.
///
/// Shares the carpool's identity fields; the stop list is replaced by the
/// enhanced stop times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedCarpool {
    pub id: String,
    pub agency: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,

    pub stops: Vec<StopTime>,

    #[serde(with = "departure_time")]
    pub departure_time: NaiveTime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<NaiveDate>,

    pub path: PathGeometry,
}

impl EnhancedCarpool {
    /// Build from the original offer, leaving it untouched.
    pub fn from_carpool(carpool: &Carpool, stops: Vec<StopTime>, path: PathGeometry) -> Self {
        Self {
            id: carpool.id.clone(),
            agency: carpool.agency.clone(),
            deeplink: carpool.deeplink.clone(),
            stops,
            departure_time: carpool.departure_time,
            departure_date: carpool.departure_date,
            path,
        }
    }

    pub fn trip_id(&self) -> String {
        format!("{}:{}", self.agency, self.id)
    }
}
