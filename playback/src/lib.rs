#![deny(rust_2018_idioms)]

//! Simulates vessels moving between waypoints and streams their position
//! reports to websocket consumers.

pub mod engine;
pub mod error;
pub mod publisher;
pub mod route;
pub mod server;
pub mod settings;
pub mod startup;
pub mod vessel;
