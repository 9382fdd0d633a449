use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

use super::{ChartWindow, TimestampedReading};

/// Accumulated readings for one sensor across polls.
///
/// Readings are kept in arrival order. `cursor()` is the timestamp of the most
/// recently appended reading (the Unix epoch before anything arrives) and is
/// what the next "readings after" request is built from.
///
/// Retention is bounded: after each append, readings older than
/// `cursor() - retention` are evicted from the front. The newest reading is
/// never evicted, so the cursor is unaffected.
#[derive(Debug, Clone)]
pub struct ReadingHistory {
    readings: VecDeque<TimestampedReading>,
    last_update: DateTime<Utc>,
    retention: Duration,
}

impl ReadingHistory {
    /// A history retaining enough data for the longest chart window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(Duration::hours(ChartWindow::LastWeek.hours()))
    }

    #[must_use]
    pub fn with_retention(retention: Duration) -> Self {
        Self {
            readings: VecDeque::new(),
            last_update: DateTime::UNIX_EPOCH,
            retention,
        }
    }

    /// Append readings in arrival order. `new_readings` must be ascending by timestamp.
    ///
    /// An empty batch leaves the history untouched.
    pub fn append(&mut self, new_readings: Vec<TimestampedReading>) {
        let Some(last) = new_readings.last() else {
            return;
        };
        self.last_update = last.timestamp;
        self.readings.extend(new_readings);
        self.evict_expired();
    }

    #[must_use]
    pub fn cursor(&self) -> DateTime<Utc> {
        self.last_update
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&TimestampedReading> {
        self.readings.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimestampedReading> {
        self.readings.iter()
    }

    #[must_use]
    pub fn retention(&self) -> Duration {
        self.retention
    }

    fn evict_expired(&mut self) {
        // A retention reaching before the representable range keeps everything.
        let Some(horizon) = self.last_update.checked_sub_signed(self.retention) else {
            return;
        };
        let before = self.readings.len();

        while self
            .readings
            .front()
            .is_some_and(|oldest| oldest.timestamp < horizon)
        {
            self.readings.pop_front();
        }

        let evicted = before - self.readings.len();
        if evicted > 0 {
            tracing::trace!(evicted, retained = self.readings.len(), "Evicted expired readings");
        }
    }
}

impl Default for ReadingHistory {
    fn default() -> Self {
        Self::new()
    }
}
