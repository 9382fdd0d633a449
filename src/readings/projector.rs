use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use super::{ReadingHistory, ReadingKind, TimestampedReading};

/// How far back from the newest reading a chart reaches.
///
/// Parsed through [`FromStr`] wherever it comes from (config or query string);
/// serialized under its canonical name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String")]
pub enum ChartWindow {
    #[serde(rename = "hour")]
    LastHour,
    #[serde(rename = "half-day")]
    LastHalfDay,
    #[default]
    #[serde(rename = "day")]
    LastDay,
    #[serde(rename = "week")]
    LastWeek,
}

impl ChartWindow {
    #[must_use]
    pub const fn hours(self) -> i64 {
        match self {
            Self::LastHour => 1,
            Self::LastHalfDay => 12,
            Self::LastDay => 24,
            Self::LastWeek => 24 * 7,
        }
    }

    #[must_use]
    pub fn span(self) -> Duration {
        Duration::hours(self.hours())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown chart window: {0:?} (expected hour, half-day, day or week)")]
pub struct UnknownWindow(pub String);

impl FromStr for ChartWindow {
    type Err = UnknownWindow;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" | "1h" => Ok(Self::LastHour),
            "half-day" | "halfday" | "12h" => Ok(Self::LastHalfDay),
            "day" | "24h" => Ok(Self::LastDay),
            "week" | "168h" | "7d" => Ok(Self::LastWeek),
            _ => Err(UnknownWindow(s.to_string())),
        }
    }
}

impl TryFrom<String> for ChartWindow {
    type Error = UnknownWindow;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One chart point: x is the reading time, y its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProjectedPoint {
    pub x: DateTime<Utc>,
    pub y: f64,
}

impl From<&TimestampedReading> for ProjectedPoint {
    fn from(reading: &TimestampedReading) -> Self {
        Self {
            x: reading.timestamp,
            y: reading.value,
        }
    }
}

/// Derive the chart points for `kind` over `window`.
///
/// Recency is anchored to the newest reading of *any* kind, not the newest of
/// `kind`. When one kind reports much less often than the other, its points
/// can fall entirely outside the window; that is accepted behaviour.
///
/// Implausible values (see [`ReadingKind::is_plausible`]) are never charted.
/// An empty result is a valid outcome and simply renders an empty chart.
#[must_use]
pub fn project(history: &ReadingHistory, kind: ReadingKind, window: ChartWindow) -> Vec<ProjectedPoint> {
    let Some(anchor) = history.last().map(|newest| newest.timestamp) else {
        return Vec::new();
    };
    let span = window.span();

    history
        .iter()
        .filter(|reading| reading.kind == kind)
        .filter(|reading| kind.is_plausible(reading.value))
        .filter(|reading| anchor - reading.timestamp <= span)
        .map(ProjectedPoint::from)
        .collect()
}
