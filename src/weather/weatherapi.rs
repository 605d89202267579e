use super::types::*;
use super::{CURRENT_PATH, FORECAST_PATH, MAX_FORECAST_DAYS};
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherApiError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    /// Non-success reply from the provider. `status` is the raw HTTP code.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<i32>,
        message: String,
    },
    #[error("Invalid forecast days: {0} (expected 1..={})", MAX_FORECAST_DAYS)]
    InvalidDays(u32),
}

/// Upstream source of weather records.
///
/// One call is one outbound request: implementations never retry and never
/// consult a cache.
#[async_trait]
pub trait WeatherOrigin: Send + Sync {
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeatherResponse, WeatherApiError>;

    async fn fetch_forecast(
        &self,
        city: &str,
        days: u32,
    ) -> Result<ForecastWeatherResponse, WeatherApiError>;
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    code: Option<i32>,
    message: String,
}

/// Client for the WeatherAPI.com REST endpoints.
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(config: &Config) -> Result<Self, WeatherApiError> {
        let client = Client::builder()
            .user_agent(concat!("weather-cache-server/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.weather_base_url.trim_end_matches('/').to_string(),
            api_key: config.weather_api_key.clone(),
        })
    }

    async fn make_request(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<Value, WeatherApiError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(api_error(status.as_u16(), &error_text))
    }
}

/// Builds an `Api` error, preferring the provider's own message when the
/// body is the usual `{"error": {"code", "message"}}` envelope.
fn api_error(status: u16, body: &str) -> WeatherApiError {
    match serde_json::from_str::<ProviderErrorBody>(body) {
        Ok(parsed) => WeatherApiError::Api {
            status,
            code: parsed.error.code,
            message: parsed.error.message,
        },
        Err(_) => WeatherApiError::Api {
            status,
            code: None,
            message: body.to_string(),
        },
    }
}

pub fn is_valid_days(days: u32) -> bool {
    (1..=MAX_FORECAST_DAYS).contains(&days)
}

#[async_trait]
impl WeatherOrigin for WeatherApiClient {
    async fn fetch_current(&self, city: &str) -> Result<CurrentWeatherResponse, WeatherApiError> {
        let response = self.make_request(CURRENT_PATH, &[("q", city)]).await?;
        let current: CurrentWeatherResponse = serde_json::from_value(response)?;
        Ok(current)
    }

    async fn fetch_forecast(
        &self,
        city: &str,
        days: u32,
    ) -> Result<ForecastWeatherResponse, WeatherApiError> {
        if !is_valid_days(days) {
            return Err(WeatherApiError::InvalidDays(days));
        }

        let days = days.to_string();
        let response = self
            .make_request(FORECAST_PATH, &[("q", city), ("days", &days)])
            .await?;
        let forecast: ForecastWeatherResponse = serde_json::from_value(response)?;
        Ok(forecast)
    }
}
