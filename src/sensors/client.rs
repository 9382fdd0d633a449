use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::readings::{ReadingKind, TimestampedReading};
use crate::sensors::models::{into_readings, LatestResponse, RawReading, StatusResponse};

/// Fetch layer consumed by the update cycle.
///
/// Implementations recover transport and parse failures themselves by
/// substituting a default (`0`, offline, no readings). An `Err` means
/// something went wrong outside that recovery and fails the whole tick.
#[async_trait]
pub trait SensorsApi: Send + Sync {
    async fn fetch_latest(&self, sensor_id: u32, kind: ReadingKind) -> AppResult<f64>;

    async fn fetch_status(&self, sensor_id: u32) -> AppResult<bool>;

    async fn fetch_readings(&self, sensor_id: u32) -> AppResult<Vec<TimestampedReading>>;

    async fn fetch_readings_after(
        &self,
        sensor_id: u32,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<TimestampedReading>>;
}

#[async_trait]
impl<T: SensorsApi + ?Sized> SensorsApi for std::sync::Arc<T> {
    async fn fetch_latest(&self, sensor_id: u32, kind: ReadingKind) -> AppResult<f64> {
        (**self).fetch_latest(sensor_id, kind).await
    }

    async fn fetch_status(&self, sensor_id: u32) -> AppResult<bool> {
        (**self).fetch_status(sensor_id).await
    }

    async fn fetch_readings(&self, sensor_id: u32) -> AppResult<Vec<TimestampedReading>> {
        (**self).fetch_readings(sensor_id).await
    }

    async fn fetch_readings_after(
        &self,
        sensor_id: u32,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<TimestampedReading>> {
        (**self).fetch_readings_after(sensor_id, since).await
    }
}

pub struct SensorsClient {
    http_client: Client,
    base_url: String,
}

impl SensorsClient {
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn new(config: &Config) -> AppResult<Self> {
        Self::with_base_url(
            &config.sensors_api_base_url,
            Duration::from_secs(config.http_timeout_seconds),
        )
    }

    /// `base_url` points at the sensors collection, e.g. `http://host:8000/api/sensors`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Internal` if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn latest_url(&self, sensor_id: u32, kind: ReadingKind) -> String {
        format!("{}/{sensor_id}/latest/{}", self.base_url, kind.code())
    }

    #[must_use]
    pub fn status_url(&self, sensor_id: u32) -> String {
        format!("{}/{sensor_id}", self.base_url)
    }

    #[must_use]
    pub fn readings_url(&self, sensor_id: u32) -> String {
        format!("{}/{sensor_id}/readings", self.base_url)
    }

    /// The cursor goes out as extended ISO-8601 with millisecond precision, e.g.
    /// `2024-03-01T12:00:00.000Z`.
    #[must_use]
    pub fn readings_after_url(&self, sensor_id: u32, since: DateTime<Utc>) -> String {
        format!(
            "{}/{sensor_id}/readings/after/{}",
            self.base_url,
            since.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::SensorsApi(format!("Request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::SensorsApi("Rate limited (429)".to_string()));
        }

        if !response.status().is_success() {
            return Err(AppError::SensorsApi(format!(
                "HTTP {}: {}",
                response.status(),
                response.text().await.unwrap_or_default()
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::SensorsApi(format!("Failed to get response text: {e}")))?;

        serde_json::from_str(&text).map_err(|e| {
            tracing::debug!(
                error = %e,
                url,
                body_preview = %text.chars().take(200).collect::<String>(),
                "Failed to parse sensors API response"
            );
            AppError::SensorsApi(format!("Failed to parse response: {e}"))
        })
    }

    /// Latest value of `kind`, without fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SensorsApi` if the request fails or the body does not parse.
    pub async fn get_latest(&self, sensor_id: u32, kind: ReadingKind) -> AppResult<f64> {
        let body: LatestResponse = self.get_json(&self.latest_url(sensor_id, kind)).await?;
        Ok(body.value)
    }

    /// Online status, without fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SensorsApi` if the request fails or the body does not parse.
    pub async fn get_status(&self, sensor_id: u32) -> AppResult<bool> {
        let body: StatusResponse = self.get_json(&self.status_url(sensor_id)).await?;
        Ok(body.is_online())
    }

    /// Every reading the server holds for the sensor, without fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SensorsApi` if the request fails or the body does not parse.
    pub async fn get_readings(&self, sensor_id: u32) -> AppResult<Vec<TimestampedReading>> {
        let raw: Vec<RawReading> = self.get_json(&self.readings_url(sensor_id)).await?;
        Ok(into_readings(raw))
    }

    /// Readings strictly newer than `since`, without fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::SensorsApi` if the request fails or the body does not parse.
    pub async fn get_readings_after(
        &self,
        sensor_id: u32,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<TimestampedReading>> {
        let raw: Vec<RawReading> = self
            .get_json(&self.readings_after_url(sensor_id, since))
            .await?;
        Ok(into_readings(raw))
    }
}

fn or_default<T>(result: AppResult<T>, default: T, sensor_id: u32, what: &'static str) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, sensor_id, what, "Sensors API request failed, using default");
        default
    })
}

#[async_trait]
impl SensorsApi for SensorsClient {
    async fn fetch_latest(&self, sensor_id: u32, kind: ReadingKind) -> AppResult<f64> {
        Ok(or_default(
            self.get_latest(sensor_id, kind).await,
            0.0,
            sensor_id,
            "latest",
        ))
    }

    async fn fetch_status(&self, sensor_id: u32) -> AppResult<bool> {
        Ok(or_default(
            self.get_status(sensor_id).await,
            false,
            sensor_id,
            "status",
        ))
    }

    async fn fetch_readings(&self, sensor_id: u32) -> AppResult<Vec<TimestampedReading>> {
        Ok(or_default(
            self.get_readings(sensor_id).await,
            Vec::new(),
            sensor_id,
            "readings",
        ))
    }

    async fn fetch_readings_after(
        &self,
        sensor_id: u32,
        since: DateTime<Utc>,
    ) -> AppResult<Vec<TimestampedReading>> {
        Ok(or_default(
            self.get_readings_after(sensor_id, since).await,
            Vec::new(),
            sensor_id,
            "readings_after",
        ))
    }
}
