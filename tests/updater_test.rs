//! Update cycle tests: one tick against a scripted API and a recording view.
//!
//! Run with: cargo test --test updater_test

mod common;

use chrono::DateTime;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use common::{hum, minutes, t0, temp, FakeApi, RecordingView, ViewCall};
use sensor_card::readings::{
    ChartWindow, ProjectedPoint, Reading, ReadingKind, TemperatureUnit,
};
use sensor_card::sensors::SensorsClient;
use sensor_card::sync::scheduler::run_card_refresh;
use sensor_card::sync::{Poller, SensorUpdater, TickOutcome};
use sensor_card::view::{CardHandle, SensorCard};

fn updater(api: FakeApi) -> SensorUpdater<FakeApi, RecordingView> {
    SensorUpdater::new(api, RecordingView::default(), 1)
}

#[tokio::test]
async fn tick_pushes_scalars_and_charts() {
    let api = FakeApi::new(25.0, 55.0, true).with_batch(vec![
        temp(25.0, t0()),
        temp(-1.0, t0() + minutes(1)),
        hum(55.0, t0() + minutes(2)),
        hum(10.0, t0() + minutes(3)),
    ]);
    let mut updater = updater(api);

    assert!(updater.refresh().await);

    let view = updater.view();
    assert_eq!(view.onlines(), vec![true]);
    assert_eq!(
        view.currents(),
        vec![Reading::celsius(25.0), Reading::percent(55.0)]
    );
    assert_eq!(
        view.charts(),
        vec![
            (
                ReadingKind::Temperature,
                vec![ProjectedPoint { x: t0(), y: 25.0 }]
            ),
            (
                ReadingKind::Humidity,
                vec![ProjectedPoint {
                    x: t0() + minutes(2),
                    y: 55.0
                }]
            ),
        ]
    );
    assert_eq!(updater.history().len(), 4);
    assert_eq!(updater.history().cursor(), t0() + minutes(3));
}

#[tokio::test]
async fn empty_readings_skip_chart_push_but_not_scalars() {
    let mut updater = updater(FakeApi::new(21.0, 40.0, false));

    assert!(updater.refresh().await);

    let view = updater.view();
    assert!(view.charts().is_empty());
    assert_eq!(view.onlines(), vec![false]);
    assert_eq!(view.currents().len(), 2);
    assert_eq!(updater.history().cursor(), DateTime::UNIX_EPOCH);
}

#[tokio::test]
async fn scalars_are_pushed_every_tick_even_when_unchanged() {
    let mut updater = updater(FakeApi::new(21.0, 40.0, true));

    assert!(updater.refresh().await);
    assert!(updater.refresh().await);

    assert_eq!(updater.view().onlines(), vec![true, true]);
    assert_eq!(updater.view().currents().len(), 4);
}

#[tokio::test]
async fn cursor_advances_between_ticks() {
    let api = Arc::new(
        FakeApi::new(21.0, 40.0, true).with_batch(vec![temp(21.0, t0()), hum(40.0, t0() + minutes(1))]),
    );
    let mut updater = SensorUpdater::new(Arc::clone(&api), RecordingView::default(), 1);

    assert!(updater.refresh().await);
    api.push_batch(vec![temp(22.0, t0() + minutes(2))]);
    assert!(updater.refresh().await);
    assert!(updater.refresh().await);

    assert_eq!(
        api.cursors(),
        vec![DateTime::UNIX_EPOCH, t0() + minutes(1), t0() + minutes(2)]
    );
    assert_eq!(updater.history().len(), 3);
    // Charts only pushed on the two ticks that brought readings.
    assert_eq!(updater.view().charts().len(), 4);
}

#[tokio::test]
async fn readings_at_or_before_cursor_are_not_ingested_twice() {
    let api = Arc::new(FakeApi::new(21.0, 40.0, true).with_batch(vec![temp(21.0, t0())]));
    let mut updater = SensorUpdater::new(Arc::clone(&api), RecordingView::default(), 1);

    assert!(updater.refresh().await);
    // A server treating the cursor inclusively sends the last reading again.
    api.push_batch(vec![temp(21.0, t0())]);
    assert!(updater.refresh().await);

    assert_eq!(updater.history().len(), 1);
    assert_eq!(updater.view().charts().len(), 2);
}

#[tokio::test]
async fn failed_tick_leaves_everything_untouched() {
    let api = Arc::new(FakeApi::new(21.0, 40.0, true).with_batch(vec![temp(21.0, t0())]));
    api.fail_readings(true);
    let mut updater = SensorUpdater::new(Arc::clone(&api), RecordingView::default(), 1);

    assert!(!updater.refresh().await);
    assert!(updater.view().calls.is_empty());
    assert!(updater.history().is_empty());
    assert_eq!(updater.history().cursor(), DateTime::UNIX_EPOCH);

    // The next tick is the retry.
    api.fail_readings(false);
    assert!(updater.refresh().await);
    assert_eq!(updater.history().len(), 1);
}

#[tokio::test]
async fn fahrenheit_preference_and_name() {
    let mut updater = updater(FakeApi::new(25.0, 50.0, true))
        .with_name("Salon")
        .with_temperature_unit(TemperatureUnit::Fahrenheit)
        .with_chart_window(ChartWindow::LastHour);

    assert!(updater.refresh().await);

    let view = updater.view();
    assert_eq!(view.calls[0], ViewCall::Name("Salon".to_string()));
    assert_eq!(view.currents()[0], Reading::fahrenheit(25.0));
}

#[tokio::test]
async fn status_transport_failure_shows_offline() {
    let base_url = common::dead_base_url().await;
    let client = SensorsClient::with_base_url(&base_url, StdDuration::from_secs(2)).unwrap();
    let mut updater = SensorUpdater::new(client, RecordingView::default(), 1);

    assert!(updater.refresh().await);

    let view = updater.view();
    assert_eq!(view.onlines(), vec![false]);
    assert_eq!(
        view.currents(),
        vec![Reading::celsius(0.0), Reading::percent(0.0)]
    );
    assert!(view.charts().is_empty());
}

#[tokio::test]
async fn overlapping_tick_is_skipped() {
    let api = Arc::new(FakeApi::new(21.0, 40.0, true).with_batch(vec![temp(21.0, t0())]));
    let card = CardHandle::new(SensorCard::new(&ReadingKind::ALL));
    let poller = Poller::new(SensorUpdater::new(Arc::clone(&api), card.clone(), 1));

    let gate = api.hold().await;
    let first = tokio::spawn({
        let poller = poller.clone();
        async move { poller.tick().await }
    });
    while api.started() == 0 {
        tokio::task::yield_now().await;
    }

    assert_eq!(poller.tick().await, TickOutcome::Skipped);

    drop(gate);
    assert_eq!(first.await.unwrap(), TickOutcome::Succeeded);
    assert_eq!(poller.history_len().await, 1);
    assert_eq!(api.started(), 1);
    assert!(card.read().is_online());
}

#[tokio::test]
async fn scheduler_fires_first_tick_immediately() {
    let api = Arc::new(FakeApi::new(21.0, 40.0, true).with_batch(vec![temp(21.0, t0())]));
    let card = CardHandle::new(SensorCard::new(&ReadingKind::ALL));
    let poller = Poller::new(SensorUpdater::new(Arc::clone(&api), card.clone(), 1));

    let task = tokio::spawn(run_card_refresh(poller.clone(), 3600));

    tokio::time::timeout(StdDuration::from_secs(5), async {
        while poller.history_len().await == 0 {
            tokio::time::sleep(StdDuration::from_millis(10)).await;
        }
    })
    .await
    .expect("first tick should ingest the batch");
    task.abort();

    assert_eq!(api.started(), 1);
    assert!(card.read().is_online());
}

#[tokio::test]
async fn projection_waits_for_in_flight_tick() {
    let api = Arc::new(
        FakeApi::new(21.0, 40.0, true)
            .with_batch(vec![temp(21.0, t0()), hum(40.0, t0() + minutes(1))]),
    );
    let card = CardHandle::new(SensorCard::new(&ReadingKind::ALL));
    let poller = Poller::new(SensorUpdater::new(Arc::clone(&api), card, 1));

    let gate = api.hold().await;
    let tick = tokio::spawn({
        let poller = poller.clone();
        async move { poller.tick().await }
    });
    while api.started() == 0 {
        tokio::task::yield_now().await;
    }

    let projection = tokio::spawn({
        let poller = poller.clone();
        async move { poller.project(ReadingKind::Temperature, ChartWindow::LastDay).await }
    });
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(!projection.is_finished());

    drop(gate);
    assert_eq!(tick.await.unwrap(), TickOutcome::Succeeded);
    let projection = projection.await.unwrap();
    assert_eq!(projection.retained, 2);
    assert_eq!(projection.points, vec![ProjectedPoint { x: t0(), y: 21.0 }]);
}
