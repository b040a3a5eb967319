use snafu::{Location, Snafu};

use crate::IsRetryable;

pub type CoreResult<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module(core_error), visibility(pub))]
pub enum Error {
    #[snafu(display("Failed a storage operation"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage { .. })
    }
}

/// Reasons a single report, command or event is refused.
/// These are counted and logged, never treated as faults.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(module, visibility(pub))]
pub enum ValidationError {
    #[snafu(display("Latitude '{value}' is outside [-90, 90]"))]
    LatitudeOutOfRange { value: f64 },
    #[snafu(display("Longitude '{value}' is outside [-180, 180]"))]
    LongitudeOutOfRange { value: f64 },
    #[snafu(display("Speed '{value}' is negative or not a number"))]
    InvalidSpeed { value: f64 },
    #[snafu(display("Course '{value}' is outside [0, 360)"))]
    CourseOutOfRange { value: f64 },
    #[snafu(display("Heading '{value}' is outside [0, 360)"))]
    HeadingOutOfRange { value: f64 },
    #[snafu(display("Invalid mmsi '{value}', expected exactly 9 digits"))]
    InvalidMmsi { value: String },
    #[snafu(display("Speed factor '{value}' must be a positive number"))]
    InvalidSpeedFactor { value: f64 },
    #[snafu(display("Unrecognized message: {reason}"))]
    UnknownMessage { reason: String },
}

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum DateRangeError {
    #[snafu(display("Start '{start}' is after end '{end}'"))]
    Ordering {
        #[snafu(implicit)]
        location: Location,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    },
}
