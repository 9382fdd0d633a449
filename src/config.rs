use std::env;

use crate::readings::{ChartWindow, TemperatureUnit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Sensors API
    pub sensors_api_base_url: String,
    pub http_timeout_seconds: u64,

    // Card
    pub sensor_id: u32,
    pub sensor_name: String,
    pub temperature_unit: TemperatureUnit,

    // Polling and charting
    pub poll_interval_seconds: u64,
    pub chart_window: ChartWindow,
    pub history_retention_hours: i64,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if required environment variables are not set,
    /// or `ConfigError::Invalid` if an enumerated setting has an unknown value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_env`].
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chart_window_raw = var("CHART_WINDOW").unwrap_or_else(|| "day".to_string());
        let chart_window: ChartWindow = chart_window_raw
            .parse()
            .map_err(|_| ConfigError::Invalid("CHART_WINDOW", chart_window_raw))?;

        let unit_raw = var("TEMPERATURE_UNIT").unwrap_or_else(|| "celsius".to_string());
        let temperature_unit: TemperatureUnit = unit_raw
            .parse()
            .map_err(|_| ConfigError::Invalid("TEMPERATURE_UNIT", unit_raw))?;

        Ok(Self {
            // Sensors API
            sensors_api_base_url: var("SENSORS_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .ok_or(ConfigError::Missing("SENSORS_API_BASE_URL"))?,
            http_timeout_seconds: var("HTTP_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),

            // Card
            sensor_id: var("SENSOR_ID")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            sensor_name: var("SENSOR_NAME").unwrap_or_else(|| "Salon".to_string()),
            temperature_unit,

            // Polling and charting
            poll_interval_seconds: var("POLL_INTERVAL_SECONDS")
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(30),
            chart_window,
            history_retention_hours: var("HISTORY_RETENTION_HOURS")
                .and_then(|v| v.parse().ok())
                .filter(|hours| *hours > 0)
                .unwrap_or(ChartWindow::LastWeek.hours()),

            // API settings
            api_host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            api_port: var("API_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),

            // Application metadata
            deployment: Deployment::from_str(
                &var("DEPLOYMENT").unwrap_or_else(|| "local".to_string()),
            ),
        })
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
