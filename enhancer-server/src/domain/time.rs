//! Service-day times for published stop times.
//!
//! Trip planners expect stop times as "HH:MM:SS" measured from midnight of
//! the service day. A carpool departing late in the evening keeps counting
//! past midnight ("25:10:00") instead of wrapping, so times here are a plain
//! offset rather than a time of day.

use std::fmt;
use std::ops::Add;

use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time on the service day, in whole seconds since midnight.
///
/// # Examples
///
/// ```
/// use enhancer_server::domain::GtfsTime;
///
/// let t = GtfsTime::parse("25:10:00").unwrap();
/// assert_eq!(t.to_string(), "25:10:00");
/// assert_eq!(t.seconds(), 25 * 3600 + 600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GtfsTime(u32);

impl GtfsTime {
    /// Create a time from seconds since midnight.
    pub fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// The time of day as a service-day time (always below 24:00:00).
    pub fn from_time_of_day(time: NaiveTime) -> Self {
        Self(time.num_seconds_from_midnight())
    }

    /// Parse "H:MM:SS" / "HH:MM:SS", hours unbounded.
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let mut parts = s.split(':');
        let (Some(h), Some(m), Some(sec), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TimeError::new("expected HH:MM:SS format"));
        };

        if m.len() != 2 || sec.len() != 2 || h.is_empty() {
            return Err(TimeError::new("expected HH:MM:SS format"));
        }

        let h: u32 = h.parse().map_err(|_| TimeError::new("hours not numeric"))?;
        let m: u32 = m.parse().map_err(|_| TimeError::new("minutes not numeric"))?;
        let sec: u32 = sec
            .parse()
            .map_err(|_| TimeError::new("seconds not numeric"))?;

        if m >= 60 || sec >= 60 {
            return Err(TimeError::new("minutes and seconds must be below 60"));
        }

        h.checked_mul(3600)
            .and_then(|secs| secs.checked_add(m * 60 + sec))
            .map(Self)
            .ok_or(TimeError::new("hours out of range"))
    }

    /// Seconds since midnight.
    pub fn seconds(&self) -> u32 {
        self.0
    }
}

/// Elapsed trip time is truncated to whole seconds; negative offsets clamp to
/// the base time.
impl Add<Duration> for GtfsTime {
    type Output = GtfsTime;

    fn add(self, rhs: Duration) -> GtfsTime {
        let secs = rhs.num_seconds().max(0);
        let secs = u32::try_from(secs).unwrap_or(u32::MAX - self.0);
        GtfsTime(self.0.saturating_add(secs))
    }
}

impl fmt::Display for GtfsTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = self.0 / 3600;
        let m = (self.0 % 3600) / 60;
        let s = self.0 % 60;
        write!(f, "{h:02}:{m:02}:{s:02}")
    }
}

impl Serialize for GtfsTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GtfsTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        GtfsTime::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse a departure time of day, accepting "HH:MM" or "HH:MM:SS".
pub fn parse_departure_time(s: &str) -> Result<NaiveTime, TimeError> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .map_err(|_| TimeError::new("expected HH:MM or HH:MM:SS"))
}

/// Serde adapter for carpool departure times.
///
/// Reads "HH:MM" or "HH:MM:SS", writes "HH:MM" (or "HH:MM:SS" when the
/// seconds are non-zero).
pub mod departure_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        if time.second() == 0 {
            serializer.collect_str(&time.format("%H:%M"))
        } else {
            serializer.collect_str(&time.format("%H:%M:%S"))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_departure_time(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let t = GtfsTime::parse("08:05:09").unwrap();
        assert_eq!(t.seconds(), 8 * 3600 + 5 * 60 + 9);
        assert_eq!(t.to_string(), "08:05:09");

        let t = GtfsTime::parse("7:00:00").unwrap();
        assert_eq!(t.to_string(), "07:00:00");
    }

    #[test]
    fn past_midnight_is_kept() {
        let t = GtfsTime::parse("26:00:30").unwrap();
        assert_eq!(t.to_string(), "26:00:30");
    }

    #[test]
    fn reject_invalid() {
        assert!(GtfsTime::parse("").is_err());
        assert!(GtfsTime::parse("08:00").is_err());
        assert!(GtfsTime::parse("08:60:00").is_err());
        assert!(GtfsTime::parse("08:00:61").is_err());
        assert!(GtfsTime::parse("aa:00:00").is_err());
        assert!(GtfsTime::parse("08:00:00:00").is_err());
        assert!(GtfsTime::parse("08:0:00").is_err());
        assert_eq!(
            GtfsTime::parse("4294967:00:00").unwrap_err(),
            TimeError::new("hours out of range")
        );
        assert!(GtfsTime::parse("1193046:28:15").is_ok());
        assert!(GtfsTime::parse("1193046:28:16").is_err());
    }

    #[test]
    fn overflowing_stop_time_is_deserialization_error() {
        let json = r#"{"lat": 48.0, "lon": 9.0, "arrivalTime": "4294967:00:00"}"#;
        let err = serde_json::from_str::<crate::domain::Stop>(json).unwrap_err();
        assert!(err.to_string().contains("hours out of range"));
    }

    #[test]
    fn add_elapsed() {
        let start = GtfsTime::from_time_of_day(NaiveTime::from_hms_opt(23, 50, 0).unwrap());
        let t = start + Duration::minutes(25);
        assert_eq!(t.to_string(), "24:15:00");

        // Sub-second remainders are dropped
        let t = start + Duration::milliseconds(1999);
        assert_eq!(t.to_string(), "23:50:01");

        // Negative offsets never move the time backwards
        let t = start + Duration::seconds(-30);
        assert_eq!(t, start);
    }

    #[test]
    fn departure_time_formats() {
        assert_eq!(
            parse_departure_time("07:30").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(
            parse_departure_time("07:30:15").unwrap(),
            NaiveTime::from_hms_opt(7, 30, 15).unwrap()
        );
        assert!(parse_departure_time("7.30").is_err());
        assert!(parse_departure_time("25:00").is_err());
    }

    #[test]
    fn serde_roundtrip_as_string() {
        let t = GtfsTime::parse("12:34:56").unwrap();
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"12:34:56\"");
        let back: GtfsTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }
}
