use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::readings::{ReadingKind, TimestampedReading};

/// Response from `/{id}/latest/{kind}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestResponse {
    pub value: f64,
}

/// Response from `/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    /// Only the exact string `Online` counts as online.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status == "Online"
    }
}

/// Raw element of `/{id}/readings` and `/{id}/readings/after/{ts}`.
///
/// The server emits `"?"` with a `"null"` value for readings it could not
/// decode, so kind and value stay loose here and are validated per element.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReading {
    pub timestamp: String,
    pub kind: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl RawReading {
    /// Convert into a typed reading, or `None` if any field is unusable.
    #[must_use]
    pub fn into_reading(self) -> Option<TimestampedReading> {
        let kind = self.kind.parse::<ReadingKind>().ok()?;
        let value = self.value.as_f64()?;
        let timestamp = parse_timestamp(&self.timestamp)?;
        Some(TimestampedReading::new(kind, value, timestamp))
    }
}

/// Parse a wire timestamp. RFC 3339 is expected; offset-less ISO-8601 is read as UTC.
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Typed readings from a raw batch, skipping elements that do not convert.
#[must_use]
pub fn into_readings(raw: Vec<RawReading>) -> Vec<TimestampedReading> {
    let total = raw.len();
    let readings: Vec<TimestampedReading> = raw.into_iter().filter_map(RawReading::into_reading).collect();

    let skipped = total - readings.len();
    if skipped > 0 {
        tracing::debug!(skipped, total, "Skipped unusable readings");
    }
    readings
}
