use maritime_core::DateRangeError;
use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module(analytics_error), visibility(pub))]
pub enum Error {
    #[snafu(display("Storage query failed"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        source: maritime_core::Error,
    },
    #[snafu(display("Invalid time range"))]
    InvalidRange {
        #[snafu(implicit)]
        location: Location,
        source: DateRangeError,
    },
    #[snafu(display("'{name}' must be a positive number, got '{value}'"))]
    InvalidArgument {
        #[snafu(implicit)]
        location: Location,
        name: &'static str,
        value: f64,
    },
}
