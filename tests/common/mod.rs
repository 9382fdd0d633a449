//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::json;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use sensor_card::error::{AppError, AppResult};
use sensor_card::readings::{ProjectedPoint, Reading, ReadingKind, TimestampedReading};
use sensor_card::sensors::SensorsApi;
use sensor_card::view::SensorView;

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

pub fn minutes(n: i64) -> Duration {
    Duration::minutes(n)
}

pub fn temp(value: f64, ts: DateTime<Utc>) -> TimestampedReading {
    TimestampedReading::new(ReadingKind::Temperature, value, ts)
}

pub fn hum(value: f64, ts: DateTime<Utc>) -> TimestampedReading {
    TimestampedReading::new(ReadingKind::Humidity, value, ts)
}

/// Scripted sensors API. Each tick pops the next readings batch.
pub struct FakeApi {
    pub temperature: f64,
    pub humidity: f64,
    pub online: bool,
    batches: Mutex<VecDeque<Vec<TimestampedReading>>>,
    fail_readings: AtomicBool,
    cursors: Mutex<Vec<DateTime<Utc>>>,
    started: AtomicUsize,
    gate: tokio::sync::Mutex<()>,
}

impl FakeApi {
    pub fn new(temperature: f64, humidity: f64, online: bool) -> Self {
        Self {
            temperature,
            humidity,
            online,
            batches: Mutex::new(VecDeque::new()),
            fail_readings: AtomicBool::new(false),
            cursors: Mutex::new(Vec::new()),
            started: AtomicUsize::new(0),
            gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_batch(self, batch: Vec<TimestampedReading>) -> Self {
        self.batches.lock().unwrap().push_back(batch);
        self
    }

    pub fn push_batch(&self, batch: Vec<TimestampedReading>) {
        self.batches.lock().unwrap().push_back(batch);
    }

    pub fn fail_readings(&self, fail: bool) {
        self.fail_readings.store(fail, Ordering::SeqCst);
    }

    /// Cursors received by `fetch_readings_after`, in call order.
    pub fn cursors(&self) -> Vec<DateTime<Utc>> {
        self.cursors.lock().unwrap().clone()
    }

    /// Number of `fetch_readings_after` calls that have started.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// While the returned guard is held, `fetch_readings_after` blocks.
    pub async fn hold(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.gate.lock().await
    }
}

#[async_trait]
impl SensorsApi for FakeApi {
    async fn fetch_latest(&self, _sensor_id: u32, kind: ReadingKind) -> AppResult<f64> {
        Ok(match kind {
            ReadingKind::Temperature => self.temperature,
            ReadingKind::Humidity => self.humidity,
        })
    }

    async fn fetch_status(&self, _sensor_id: u32) -> AppResult<bool> {
        Ok(self.online)
    }

    async fn fetch_readings(&self, _sensor_id: u32) -> AppResult<Vec<TimestampedReading>> {
        Ok(self.batches.lock().unwrap().iter().flatten().cloned().collect())
    }

    async fn fetch_readings_after(
        &self,
        _sensor_id: u32,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<TimestampedReading>> {
        self.cursors.lock().unwrap().push(since);
        self.started.fetch_add(1, Ordering::SeqCst);
        drop(self.gate.lock().await);

        if self.fail_readings.load(Ordering::SeqCst) {
            return Err(AppError::SensorsApi("connection reset".to_string()));
        }
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Online(bool),
    Name(String),
    Current(ReadingKind, Reading),
    Chart(ReadingKind, Vec<ProjectedPoint>),
    Append(ReadingKind, Vec<ProjectedPoint>),
}

/// View that records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub calls: Vec<ViewCall>,
}

impl RecordingView {
    pub fn charts(&self) -> Vec<(ReadingKind, Vec<ProjectedPoint>)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Chart(kind, points) => Some((*kind, points.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn currents(&self) -> Vec<Reading> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Current(_, reading) => Some(*reading),
                _ => None,
            })
            .collect()
    }

    pub fn onlines(&self) -> Vec<bool> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                ViewCall::Online(online) => Some(*online),
                _ => None,
            })
            .collect()
    }
}

impl SensorView for RecordingView {
    fn set_online(&mut self, online: bool) {
        self.calls.push(ViewCall::Online(online));
    }

    fn set_name(&mut self, name: &str) {
        self.calls.push(ViewCall::Name(name.to_string()));
    }

    fn set_current_reading(&mut self, kind: ReadingKind, reading: Reading) -> AppResult<()> {
        if reading.kind != kind {
            return Err(AppError::KindMismatch {
                expected: kind,
                actual: reading.kind,
            });
        }
        self.calls.push(ViewCall::Current(kind, reading));
        Ok(())
    }

    fn set_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>) {
        self.calls.push(ViewCall::Chart(kind, points));
    }

    fn append_chart_data(&mut self, kind: ReadingKind, points: Vec<ProjectedPoint>) {
        self.calls.push(ViewCall::Append(kind, points));
    }
}

/// What the in-process backend serves and what it saw.
#[derive(Clone, Default)]
pub struct Backend {
    pub readings: Arc<Vec<serde_json::Value>>,
    pub after_params: Arc<Mutex<Vec<String>>>,
}

async fn latest(Path((id, kind)): Path<(u32, String)>) -> impl IntoResponse {
    match (id, kind.as_str()) {
        (1, "T") => (StatusCode::OK, "{\"value\": 21.5}").into_response(),
        (1, "H") => (StatusCode::OK, "not json").into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn status(Path(id): Path<u32>) -> impl IntoResponse {
    match id {
        1 => Json(json!({"status": "Online"})).into_response(),
        3 => Json(json!({"status": "Offline"})).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn readings(State(backend): State<Backend>) -> Json<Vec<serde_json::Value>> {
    Json(backend.readings.as_ref().clone())
}

async fn readings_after(
    State(backend): State<Backend>,
    Path((_id, since)): Path<(u32, String)>,
) -> Json<Vec<serde_json::Value>> {
    backend.after_params.lock().unwrap().push(since.clone());
    let since = DateTime::parse_from_rfc3339(&since)
        .map(|ts| ts.with_timezone(&Utc))
        .unwrap_or(DateTime::UNIX_EPOCH);

    let newer = backend
        .readings
        .iter()
        .filter(|r| {
            r["timestamp"]
                .as_str()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .is_some_and(|ts| ts.with_timezone(&Utc) > since)
        })
        .cloned()
        .collect();
    Json(newer)
}

/// Serve a fake sensors API on an ephemeral port; returns its `/api/sensors` base URL.
pub async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/api/sensors/{id}", get(status))
        .route("/api/sensors/{id}/latest/{kind}", get(latest))
        .route("/api/sensors/{id}/readings", get(readings))
        .route("/api/sensors/{id}/readings/after/{since}", get(readings_after))
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/sensors")
}

/// Base URL of a port nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/sensors")
}
