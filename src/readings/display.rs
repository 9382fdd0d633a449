use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use super::ReadingKind;

/// How a value is shown on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Percent,
}

/// Display preference for temperatures. Humidity is always a percentage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "c" | "celsius" => Ok(Self::Celsius),
            "f" | "fahrenheit" => Ok(Self::Fahrenheit),
            other => Err(other.to_string()),
        }
    }
}

/// A scalar readout for the card. `value` is always in the sensor's native
/// unit (°C or %RH); `unit` only decides how [`render`] formats it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Reading {
    pub kind: ReadingKind,
    pub value: f64,
    pub unit: Unit,
}

impl Reading {
    #[must_use]
    pub const fn celsius(value: f64) -> Self {
        Self {
            kind: ReadingKind::Temperature,
            value,
            unit: Unit::Celsius,
        }
    }

    #[must_use]
    pub const fn fahrenheit(value: f64) -> Self {
        Self {
            kind: ReadingKind::Temperature,
            value,
            unit: Unit::Fahrenheit,
        }
    }

    #[must_use]
    pub const fn percent(value: f64) -> Self {
        Self {
            kind: ReadingKind::Humidity,
            value,
            unit: Unit::Percent,
        }
    }

    #[must_use]
    pub const fn temperature(value: f64, unit: TemperatureUnit) -> Self {
        match unit {
            TemperatureUnit::Celsius => Self::celsius(value),
            TemperatureUnit::Fahrenheit => Self::fahrenheit(value),
        }
    }
}

/// Format a readout the way the card shows it, e.g. `21.5C`, `77F`, `40%`.
#[must_use]
pub fn render(reading: &Reading) -> String {
    match reading.unit {
        Unit::Celsius => format!("{}C", reading.value),
        Unit::Fahrenheit => format!("{}F", reading.value * 1.8 + 32.0),
        Unit::Percent => format!("{}%", reading.value),
    }
}
