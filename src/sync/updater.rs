use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::readings::{
    project, ChartWindow, ProjectedPoint, Reading, ReadingHistory, ReadingKind, TemperatureUnit,
};
use crate::sensors::SensorsApi;
use crate::view::SensorView;

/// Drives one sensor's card: owns its reading history and its view, and runs
/// one poll per [`SensorUpdater::refresh`].
pub struct SensorUpdater<A, V> {
    api: A,
    view: V,
    sensor_id: u32,
    history: ReadingHistory,
    chart_window: ChartWindow,
    temperature_unit: TemperatureUnit,
}

impl<A: SensorsApi, V: SensorView> SensorUpdater<A, V> {
    #[must_use]
    pub fn new(api: A, view: V, sensor_id: u32) -> Self {
        Self {
            api,
            view,
            sensor_id,
            history: ReadingHistory::new(),
            chart_window: ChartWindow::default(),
            temperature_unit: TemperatureUnit::default(),
        }
    }

    /// Set the card's display name.
    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.view.set_name(name);
        self
    }

    #[must_use]
    pub fn with_chart_window(mut self, window: ChartWindow) -> Self {
        self.chart_window = window;
        self
    }

    #[must_use]
    pub fn with_temperature_unit(mut self, unit: TemperatureUnit) -> Self {
        self.temperature_unit = unit;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: ReadingHistory) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn sensor_id(&self) -> u32 {
        self.sensor_id
    }

    #[must_use]
    pub fn history(&self) -> &ReadingHistory {
        &self.history
    }

    #[must_use]
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Run one tick. Returns `false` if the tick failed; failures are logged
    /// and leave the history and the view exactly as they were.
    pub async fn refresh(&mut self) -> bool {
        match self.try_refresh().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, sensor_id = self.sensor_id, "Failed to get an update");
                false
            }
        }
    }

    /// Run one tick, surfacing the failure.
    ///
    /// # Errors
    ///
    /// Returns the first error of the four concurrent requests; nothing is
    /// written to the history or the view in that case.
    pub async fn try_refresh(&mut self) -> AppResult<()> {
        let id = self.sensor_id;
        let since = self.history.cursor();

        let (temperature, humidity, online, readings) = futures::try_join!(
            self.api.fetch_latest(id, ReadingKind::Temperature),
            self.api.fetch_latest(id, ReadingKind::Humidity),
            self.api.fetch_status(id),
            self.api.fetch_readings_after(id, since),
        )?;

        self.view.set_online(online);
        self.show_current(
            ReadingKind::Temperature,
            Reading::temperature(temperature, self.temperature_unit),
        );
        self.show_current(ReadingKind::Humidity, Reading::percent(humidity));

        // The server is asked for readings after the cursor; anything at or before it
        // would duplicate history.
        let fetched = readings.len();
        let fresh: Vec<_> = readings
            .into_iter()
            .filter(|reading| reading.timestamp > since)
            .collect();
        if fresh.len() < fetched {
            tracing::debug!(
                sensor_id = id,
                dropped = fetched - fresh.len(),
                cursor = %since,
                "Dropped readings at or before cursor"
            );
        }

        if fresh.is_empty() {
            tracing::debug!(sensor_id = id, "No new readings");
            return Ok(());
        }

        let count = fresh.len();
        self.history.append(fresh);

        for kind in ReadingKind::ALL {
            let points = project(&self.history, kind, self.chart_window);
            self.view.set_chart_data(kind, points);
        }

        tracing::debug!(
            sensor_id = id,
            count,
            retained = self.history.len(),
            cursor = %self.history.cursor(),
            "Ingested readings"
        );
        Ok(())
    }

    fn show_current(&mut self, kind: ReadingKind, reading: Reading) {
        let outcome = self.view.set_current_reading(kind, reading);
        debug_assert!(outcome.is_ok(), "current reading kind mismatch: {outcome:?}");
        if let Err(e) = outcome {
            tracing::error!(error = %e, sensor_id = self.sensor_id, "Rejected current reading");
        }
    }
}

/// What happened to a requested tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TickOutcome {
    Succeeded,
    Failed,
    /// Another tick was still in flight.
    Skipped,
}

/// Projected points together with the size of the history they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryProjection {
    pub points: Vec<ProjectedPoint>,
    /// Readings retained across all kinds.
    pub retained: usize,
}

/// Serializes ticks for one updater: a tick requested while another one runs
/// is skipped instead of interleaving writes to the same history and view.
pub struct Poller<A, V> {
    updater: Arc<Mutex<SensorUpdater<A, V>>>,
}

impl<A, V> Clone for Poller<A, V> {
    fn clone(&self) -> Self {
        Self {
            updater: Arc::clone(&self.updater),
        }
    }
}

impl<A: SensorsApi, V: SensorView> Poller<A, V> {
    #[must_use]
    pub fn new(updater: SensorUpdater<A, V>) -> Self {
        Self {
            updater: Arc::new(Mutex::new(updater)),
        }
    }

    pub async fn tick(&self) -> TickOutcome {
        let Ok(mut updater) = self.updater.try_lock() else {
            tracing::debug!("Tick already in flight, skipping");
            return TickOutcome::Skipped;
        };

        if updater.refresh().await {
            TickOutcome::Succeeded
        } else {
            TickOutcome::Failed
        }
    }

    /// Project the current history with an arbitrary window. Waits for an
    /// in-flight tick to finish; points and count come from the same history.
    pub async fn project(&self, kind: ReadingKind, window: ChartWindow) -> HistoryProjection {
        let updater = self.updater.lock().await;
        HistoryProjection {
            points: project(updater.history(), kind, window),
            retained: updater.history().len(),
        }
    }

    /// Number of readings currently retained.
    pub async fn history_len(&self) -> usize {
        self.updater.lock().await.history().len()
    }
}

