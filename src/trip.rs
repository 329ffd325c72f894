//! Trip requests as handed to the rate engine.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::RateError;

/// Accepted wall-clock format, e.g. `2025-08-07T10:00:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single rental to price.
///
/// Timestamps are local wall-clock times in the service region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrip")]
pub struct TripRequest {
    start: NaiveDateTime,
    end: NaiveDateTime,
    distance_km: f64,
}

/// Unchecked wire form; deserialized trips go through [`TripRequest::new`].
#[derive(Deserialize)]
struct RawTrip {
    start: NaiveDateTime,
    end: NaiveDateTime,
    distance_km: f64,
}

impl TryFrom<RawTrip> for TripRequest {
    type Error = RateError;

    fn try_from(raw: RawTrip) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end, raw.distance_km)
    }
}

impl TripRequest {
    /// Validates and builds a trip.
    pub fn new(
        start: NaiveDateTime,
        end: NaiveDateTime,
        distance_km: f64,
    ) -> Result<Self, RateError> {
        if end <= start {
            return Err(RateError::InvalidRange { start, end });
        }
        if !distance_km.is_finite() || distance_km < 0.0 {
            return Err(RateError::InvalidInput(format!(
                "distance must be a finite non-negative number of km, got {distance_km}"
            )));
        }

        Ok(Self {
            start,
            end,
            distance_km,
        })
    }

    /// Builds a trip from `YYYY-MM-DDTHH:MM:SS` strings.
    pub fn parse(start: &str, end: &str, distance_km: f64) -> Result<Self, RateError> {
        Self::new(parse_timestamp(start)?, parse_timestamp(end)?, distance_km)
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Wall-clock duration in hours, unrounded.
    pub fn duration_hours(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Parses a local wall-clock timestamp.
///
/// Fractional seconds and a space separator are tolerated since exported
/// trip sheets use both.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, RateError> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M"))
        .map_err(|source| RateError::Parse {
            value: value.to_string(),
            source,
        })
}
