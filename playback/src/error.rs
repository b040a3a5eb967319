use maritime_core::ValidationError;
use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Invalid input"))]
    Validation {
        #[snafu(implicit)]
        location: Location,
        source: ValidationError,
    },
    #[snafu(display("Message interval must be positive"))]
    InvalidInterval {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("The playback engine is already running"))]
    AlreadyRunning {
        #[snafu(implicit)]
        location: Location,
    },
    #[snafu(display("Failed to plan a route for vessel '{mmsi}'"))]
    RoutePlanning {
        #[snafu(implicit)]
        location: Location,
        mmsi: maritime_core::Mmsi,
        reason: String,
    },
    #[snafu(display("Failed to bind publisher to '{address}'"))]
    Bind {
        #[snafu(implicit)]
        location: Location,
        address: String,
        #[snafu(source)]
        error: std::io::Error,
    },
    #[snafu(display("IO error"))]
    Io {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: std::io::Error,
    },
    #[snafu(display("Websocket error"))]
    WebSocket {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: tokio_tungstenite::tungstenite::Error,
    },
    #[snafu(display("Event sink is closed"))]
    SinkClosed {
        #[snafu(implicit)]
        location: Location,
    },
}
