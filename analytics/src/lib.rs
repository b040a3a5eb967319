#![deny(rust_2018_idioms)]

//! Read-only analytics over stored position reports: active vessels, vessel
//! summaries, windowed statistics, tracks, density maps and encounters.

mod engine;
mod error;
mod models;

pub use engine::*;
pub use error::*;
pub use models::*;
