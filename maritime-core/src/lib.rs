#![deny(rust_2018_idioms)]

//! Shared domain types, storage ports and ambient plumbing for the simulation,
//! ingestion and analytics services.

mod domain;
mod error;
mod mean;
mod messages;
mod ports;
mod retry;
mod settings;
mod telemetry;

pub mod geo;

#[cfg(feature = "test")]
pub mod test_helper;

pub use domain::*;
pub use error::*;
pub use mean::*;
pub use messages::*;
pub use ports::*;
pub use retry::*;
pub use settings::*;
pub use telemetry::*;
