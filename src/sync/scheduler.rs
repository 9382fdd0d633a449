use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::sensors::SensorsApi;
use crate::sync::updater::{Poller, TickOutcome};
use crate::view::SensorView;

/// Run the card refresh on a schedule.
///
/// The first tick fires immediately. Every tick runs as its own task so the
/// timer keeps its period however long a poll takes; the poller skips a tick
/// while the previous one is still in flight. A failed tick is not retried,
/// the next period is the retry.
pub async fn run_card_refresh<A, V>(poller: Poller<A, V>, interval_secs: u64)
where
    A: SensorsApi + 'static,
    V: SensorView + 'static,
{
    tracing::info!(interval_secs, "Starting card refresh scheduler");

    let mut ticker = interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let poller = poller.clone();
        tokio::spawn(async move {
            match poller.tick().await {
                TickOutcome::Succeeded => tracing::debug!("Card refresh completed"),
                TickOutcome::Failed => tracing::debug!("Card refresh failed, waiting for next tick"),
                TickOutcome::Skipped => {
                    tracing::warn!("Previous card refresh still running, tick skipped");
                }
            }
        });
    }
}
