#![deny(rust_2018_idioms)]

//! Implements a binary that consumes the live position stream, validates and
//! deduplicates the reports and commits them in batches to postgres.

pub mod consumer;
pub mod counters;
pub mod error;
pub mod feed;
pub mod pipeline;
pub mod settings;
pub mod startup;
