//! Sensor Card - live dashboard card for a temperature/humidity sensor
//!
//! Polls a sensors HTTP API, keeps a bounded reading history, projects it into
//! chart datasets and serves the resulting card. This library exposes the core
//! modules for testing and reuse.

pub mod common;
pub mod config;
pub mod error;
pub mod readings;
pub mod routes;
pub mod sensors;
pub mod sync;
pub mod view;
