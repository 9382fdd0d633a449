//! Sensor readings and the charting pipeline built on them.
//!
//! - [`history`]: per-sensor accumulated readings with a high-water-mark cursor.
//! - [`projector`]: windowed, plausibility-filtered chart points derived from a history.
//! - [`display`]: unit-tagged display values for the card's scalar readouts.

pub mod display;
pub mod history;
pub mod projector;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub use display::{Reading, TemperatureUnit, Unit};
pub use history::ReadingHistory;
pub use projector::{project, ChartWindow, ProjectedPoint};

/// What a reading measures. Serialized with the sensors API's one-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub enum ReadingKind {
    #[serde(rename = "T")]
    Temperature,
    #[serde(rename = "H")]
    Humidity,
}

impl ReadingKind {
    pub const ALL: [Self; 2] = [Self::Temperature, Self::Humidity];

    /// Wire code used in URLs and JSON bodies.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Temperature => "T",
            Self::Humidity => "H",
        }
    }

    /// Sensor fault heuristic: the DHT-class sensors report 0 °C or a very low
    /// humidity when a read goes wrong, so those values never reach a chart.
    #[must_use]
    pub fn is_plausible(self, value: f64) -> bool {
        match self {
            Self::Temperature => value > 0.0,
            Self::Humidity => value > 20.0,
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown reading kind: {0:?}")]
pub struct UnknownKind(pub String);

impl FromStr for ReadingKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "T" | "t" | "temperature" => Ok(Self::Temperature),
            "H" | "h" | "humidity" => Ok(Self::Humidity),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// A single measurement as delivered by the sensors API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimestampedReading {
    pub kind: ReadingKind,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

impl TimestampedReading {
    #[must_use]
    pub const fn new(kind: ReadingKind, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            value,
            timestamp,
        }
    }
}
