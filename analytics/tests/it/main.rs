#![deny(rust_2018_idioms)]

pub mod active_vessels;
pub mod helper;
