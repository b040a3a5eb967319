use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(module, visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to commit a batch of {size} position reports"))]
    BatchCommit {
        #[snafu(implicit)]
        location: Location,
        size: usize,
        source: maritime_core::Error,
    },
    #[snafu(display("Storage error"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        source: maritime_core::Error,
    },
    #[snafu(display("Postgres error"))]
    Postgres {
        #[snafu(implicit)]
        location: Location,
        source: postgres::Error,
    },
    #[snafu(display("Websocket error"))]
    WebSocket {
        #[snafu(implicit)]
        location: Location,
        #[snafu(source)]
        error: tokio_tungstenite::tungstenite::Error,
    },
    #[snafu(display("Position feed closed unexpectedly"))]
    StreamClosed {
        #[snafu(implicit)]
        location: Location,
    },
}
