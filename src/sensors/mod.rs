pub mod client;
pub mod models;

pub use client::{SensorsApi, SensorsClient};
