//! Stop times of an enhanced carpool, and the candidates they are built from.

use chrono::Duration;
use geo::Coord;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::carpool::PickupDropoff;
use super::time::GtfsTime;

/// GTFS `pickup_type` / `drop_off_type`: not available.
const STOP_TYPE_NONE: u8 = 1;

/// GTFS `pickup_type` / `drop_off_type`: coordinate with the driver.
const STOP_TYPE_COORDINATE_DRIVER: u8 = 3;

/// GTFS `timepoint`: times are approximate.
const TIMEPOINT_APPROXIMATE: u8 = 0;

/// A published stop of an enhanced carpool.
///
/// Arrival and departure are always equal; dwell time is not modelled.
/// Serialized with the GTFS `pickup_type`, `drop_off_type` and `timepoint`
/// codes derived from `pickup_dropoff`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopTime {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub arrival_time: GtfsTime,
    pub departure_time: GtfsTime,

    #[serde(rename = "pickup_dropoff")]
    pub pickup_dropoff: PickupDropoff,

    /// 1-based position within the trip.
    pub sequence: u32,
}

impl StopTime {
    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }

    fn gtfs_pickup_type(&self) -> u8 {
        if self.pickup_dropoff.allows_pickup() {
            STOP_TYPE_COORDINATE_DRIVER
        } else {
            STOP_TYPE_NONE
        }
    }

    fn gtfs_drop_off_type(&self) -> u8 {
        if self.pickup_dropoff.allows_dropoff() {
            STOP_TYPE_COORDINATE_DRIVER
        } else {
            STOP_TYPE_NONE
        }
    }

    fn gtfs_timepoint(&self) -> u8 {
        TIMEPOINT_APPROXIMATE
    }
}

impl Serialize for StopTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("StopTime", 11)?;
        st.serialize_field("id", &self.id)?;
        st.serialize_field("name", &self.name)?;
        st.serialize_field("lat", &self.lat)?;
        st.serialize_field("lon", &self.lon)?;
        st.serialize_field("arrivalTime", &self.arrival_time)?;
        st.serialize_field("departureTime", &self.departure_time)?;
        st.serialize_field("pickup_dropoff", &self.pickup_dropoff)?;
        st.serialize_field("sequence", &self.sequence)?;
        st.serialize_field("pickup_type", &self.gtfs_pickup_type())?;
        st.serialize_field("drop_off_type", &self.gtfs_drop_off_type())?;
        st.serialize_field("timepoint", &self.gtfs_timepoint())?;
        st.end()
    }
}

/// A point near a routed path that may become a stop time.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateStop {
    /// Matched stop id; `None` for a free-form carpool coordinate.
    pub id: Option<String>,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,

    /// Distance along the route from its start, in meters.
    pub distance_m: f64,

    /// Driving time from departure; zero until estimated.
    pub elapsed: Duration,
}

impl CandidateStop {
    pub fn new(
        id: Option<String>,
        name: Option<String>,
        coord: Coord<f64>,
        distance_m: f64,
    ) -> Self {
        Self {
            id,
            name,
            lat: coord.y,
            lon: coord.x,
            distance_m,
            elapsed: Duration::zero(),
        }
    }

    pub fn is_matched(&self) -> bool {
        self.id.is_some()
    }
}
