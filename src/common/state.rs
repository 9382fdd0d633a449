use std::sync::Arc;

use crate::config::Config;
use crate::readings::{ChartWindow, ReadingHistory, ReadingKind};
use crate::sensors::SensorsApi;
use crate::sync::{Poller, SensorUpdater};
use crate::view::{CardHandle, EnglishLocalization, Localization, SensorCard};

/// The fetch layer as the server holds it, so handlers do not depend on the transport.
pub type SharedSensorsApi = Arc<dyn SensorsApi>;

/// Poller driving the served card.
pub type CardPoller = Poller<SharedSensorsApi, CardHandle>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub card: CardHandle,
    pub poller: CardPoller,
    pub localization: Arc<dyn Localization>,
}

impl AppState {
    /// Wire a card, its history and its update cycle for the configured sensor.
    pub fn new(config: Config, api: SharedSensorsApi) -> Self {
        let card = CardHandle::new(SensorCard::new(&ReadingKind::ALL));

        let retention = chrono::Duration::try_hours(config.history_retention_hours)
            .unwrap_or_else(|| ChartWindow::LastWeek.span());
        let history = ReadingHistory::with_retention(retention);
        let updater = SensorUpdater::new(api, card.clone(), config.sensor_id)
            .with_name(&config.sensor_name)
            .with_chart_window(config.chart_window)
            .with_temperature_unit(config.temperature_unit)
            .with_history(history);

        Self {
            config: Arc::new(config),
            card,
            poller: Poller::new(updater),
            localization: Arc::new(EnglishLocalization),
        }
    }
}
