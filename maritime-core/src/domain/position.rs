use chrono::{DateTime, Utc};

use crate::{
    Coordinates, Mmsi, ValidationError,
    geo::{is_valid_latitude, is_valid_longitude},
    validation_error::{
        CourseOutOfRangeSnafu, HeadingOutOfRangeSnafu, InvalidSpeedSnafu,
        LatitudeOutOfRangeSnafu, LongitudeOutOfRangeSnafu,
    },
};

/// Positions are compared at 1e-7 degrees (about 1 cm) when deduplicating.
const POSITION_PRECISION: f64 = 1e7;

/// A position report that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPositionReport {
    pub mmsi: Mmsi,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Speed over ground in knots.
    pub speed: f64,
    /// Course over ground in degrees.
    pub course: f64,
    pub heading: Option<f64>,
}

/// A stored position report. `sequence` is assigned by storage on insertion
/// and only used to order reports sharing a timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub sequence: i64,
    pub mmsi: Mmsi,
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub course: f64,
    pub heading: Option<f64>,
}

/// Identity of a report for duplicate detection: millisecond timestamp and
/// fixed-point position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportKey {
    pub timestamp_millis: i64,
    pub latitude: i64,
    pub longitude: i64,
}

impl NewPositionReport {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !is_valid_latitude(self.latitude) {
            return LatitudeOutOfRangeSnafu {
                value: self.latitude,
            }
            .fail();
        }
        if !is_valid_longitude(self.longitude) {
            return LongitudeOutOfRangeSnafu {
                value: self.longitude,
            }
            .fail();
        }
        if !(self.speed.is_finite() && self.speed >= 0.0) {
            return InvalidSpeedSnafu { value: self.speed }.fail();
        }
        if !is_compass_degrees(self.course) {
            return CourseOutOfRangeSnafu { value: self.course }.fail();
        }
        if let Some(heading) = self.heading {
            if !is_compass_degrees(heading) {
                return HeadingOutOfRangeSnafu { value: heading }.fail();
            }
        }
        Ok(())
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn key(&self) -> ReportKey {
        ReportKey::new(self.timestamp, self.latitude, self.longitude)
    }

    pub fn with_sequence(self, sequence: i64) -> PositionReport {
        let NewPositionReport {
            mmsi,
            timestamp,
            latitude,
            longitude,
            speed,
            course,
            heading,
        } = self;

        PositionReport {
            sequence,
            mmsi,
            timestamp,
            latitude,
            longitude,
            speed,
            course,
            heading,
        }
    }
}

impl PositionReport {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    pub fn key(&self) -> ReportKey {
        ReportKey::new(self.timestamp, self.latitude, self.longitude)
    }
}

impl From<PositionReport> for NewPositionReport {
    fn from(value: PositionReport) -> Self {
        let PositionReport {
            sequence: _,
            mmsi,
            timestamp,
            latitude,
            longitude,
            speed,
            course,
            heading,
        } = value;

        NewPositionReport {
            mmsi,
            timestamp,
            latitude,
            longitude,
            speed,
            course,
            heading,
        }
    }
}

impl ReportKey {
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> ReportKey {
        ReportKey {
            timestamp_millis: timestamp.timestamp_millis(),
            latitude: (latitude * POSITION_PRECISION).round() as i64,
            longitude: (longitude * POSITION_PRECISION).round() as i64,
        }
    }
}

fn is_compass_degrees(value: f64) -> bool {
    value.is_finite() && (0.0..360.0).contains(&value)
}

#[cfg(feature = "test")]
mod test {
    use rand::Rng;

    use super::*;

    impl NewPositionReport {
        pub fn test_default(mmsi: Mmsi, timestamp: DateTime<Utc>) -> NewPositionReport {
            let mut rng = rand::rng();
            NewPositionReport {
                mmsi,
                timestamp,
                latitude: rng.random_range(-80.0..80.0),
                longitude: rng.random_range(-170.0..170.0),
                speed: rng.random_range(0.0..25.0),
                course: rng.random_range(0.0..360.0),
                heading: Some(rng.random_range(0.0..360.0)),
            }
        }
    }
}
