use maritime_core::{ValidationError, core_error::StorageSnafu};
use snafu::{IntoError, Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to connect to postgres"))]
    Connection {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: sqlx::Error,
    },
    #[snafu(display("Failed to run migrations"))]
    Migrate {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: sqlx::migrate::MigrateError,
    },
    #[snafu(display("Failed a database query"))]
    Query {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: sqlx::Error,
    },
    #[snafu(display("Failed to convert stored data"))]
    DataConversion {
        #[snafu(implicit)]
        location: Location,
        source: ValidationError,
    },
}

impl From<Error> for maritime_core::Error {
    #[track_caller]
    fn from(value: Error) -> Self {
        StorageSnafu.into_error(Box::new(value))
    }
}
