#![deny(rust_2018_idioms)]

//! Postgres implementation of the position report storage ports.

mod adapter;
mod error;
mod models;
mod queries;

pub use adapter::{PostgresAdapter, PsqlLogStatements, PsqlSettings};
pub use error::{Error, Result};
