//! Bike-sharing station snapshot collector

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Time sources
pub mod clock;

/// Station payload
pub mod dataset;

/// Invocation entry point and outcome reporting
pub mod handler;

/// Snapshot key derivation and upload
pub mod snapshot;

/// Station provider API client
pub mod station_api;

/// Configuration types
pub mod types;
