pub mod scheduler;
pub mod updater;

pub use updater::{HistoryProjection, Poller, SensorUpdater, TickOutcome};
